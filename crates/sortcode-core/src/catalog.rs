//! Static rule tables: the HMRC category catalog, keyword maps,
//! non-allowable keyword sets, mixed-use guidance, and business-type rules.
//!
//! Everything here is immutable `'static` data loaded at compile time. The
//! keyword tables are ordered slices, not hash maps: the scorer's tie-break
//! (first category reaching the maximum wins) depends on a fixed, stable
//! iteration order.

use crate::models::BusinessType;

/// One entry in the HMRC category catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryDef {
    /// Stable code used in results and the classifier contract.
    pub code: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// HMRC reference (SA103F / SA105 box).
    pub hmrc_ref: &'static str,
}

/// Self-employment expense categories (SA103F).
pub const SELF_EMPLOYMENT_EXPENSES: &[CategoryDef] = &[
    CategoryDef {
        code: "costOfGoods",
        name: "Cost of goods bought for resale",
        description: "Stock, raw materials and direct costs of goods sold",
        hmrc_ref: "SA103F box 17",
    },
    CategoryDef {
        code: "paymentsToSubcontractors",
        name: "Payments to subcontractors",
        description: "Construction industry subcontractor payments",
        hmrc_ref: "SA103F box 18",
    },
    CategoryDef {
        code: "wagesAndStaff",
        name: "Wages, salaries and other staff costs",
        description: "Employee wages, salaries, NI, pensions",
        hmrc_ref: "SA103F box 19",
    },
    CategoryDef {
        code: "travelCosts",
        name: "Car, van and travel expenses",
        description: "Fuel, fares, vehicle running costs, hotels",
        hmrc_ref: "SA103F box 20",
    },
    CategoryDef {
        code: "premisesCosts",
        name: "Rent, rates, power and insurance",
        description: "Business premises rent, utilities and insurance",
        hmrc_ref: "SA103F box 21",
    },
    CategoryDef {
        code: "maintenanceCosts",
        name: "Repairs and maintenance",
        description: "Repairs and renewals of property and equipment",
        hmrc_ref: "SA103F box 22",
    },
    CategoryDef {
        code: "adminCosts",
        name: "Phone, stationery and other office costs",
        description: "Office consumables, phone, software, postage",
        hmrc_ref: "SA103F box 23",
    },
    CategoryDef {
        code: "advertising",
        name: "Advertising and business entertainment costs",
        description: "Advertising and marketing (client entertainment is not allowable)",
        hmrc_ref: "SA103F box 24",
    },
    CategoryDef {
        code: "interestOnLoans",
        name: "Interest on bank and other loans",
        description: "Business loan and overdraft interest",
        hmrc_ref: "SA103F box 25",
    },
    CategoryDef {
        code: "financialCharges",
        name: "Bank, credit card and other financial charges",
        description: "Bank charges, card fees, currency costs",
        hmrc_ref: "SA103F box 26",
    },
    CategoryDef {
        code: "badDebts",
        name: "Irrecoverable debts written off",
        description: "Amounts included in turnover but never received",
        hmrc_ref: "SA103F box 27",
    },
    CategoryDef {
        code: "professionalFees",
        name: "Accountancy, legal and other professional fees",
        description: "Accountants, solicitors, surveyors, consultants",
        hmrc_ref: "SA103F box 28",
    },
    CategoryDef {
        code: "depreciation",
        name: "Depreciation and loss on sale",
        description: "Depreciation of assets (not allowable for tax)",
        hmrc_ref: "SA103F box 29",
    },
    CategoryDef {
        code: "other",
        name: "Other business expenses",
        description: "Allowable expenses not covered elsewhere",
        hmrc_ref: "SA103F box 30",
    },
];

/// Self-employment income categories.
pub const SELF_EMPLOYMENT_INCOME: &[CategoryDef] = &[
    CategoryDef {
        code: "turnover",
        name: "Business income (turnover)",
        description: "Sales and business takings",
        hmrc_ref: "SA103F box 15",
    },
    CategoryDef {
        code: "otherBusinessIncome",
        name: "Other business income",
        description: "Income not included in turnover, e.g. grants",
        hmrc_ref: "SA103F box 16",
    },
];

/// Property expense categories (SA105).
pub const PROPERTY_EXPENSES: &[CategoryDef] = &[
    CategoryDef {
        code: "rentRatesAndInsurance",
        name: "Rent, rates, insurance and ground rents",
        description: "Running costs of the let property",
        hmrc_ref: "SA105 box 24",
    },
    CategoryDef {
        code: "propertyRepairs",
        name: "Property repairs and maintenance",
        description: "Repairs restoring the property to its original state",
        hmrc_ref: "SA105 box 25",
    },
    CategoryDef {
        code: "loanInterest",
        name: "Loan interest and other financial costs",
        description: "Interest on loans to buy or improve the property",
        hmrc_ref: "SA105 box 26",
    },
    CategoryDef {
        code: "legalAndManagementFees",
        name: "Legal, management and other professional fees",
        description: "Letting agents, accountants, legal fees",
        hmrc_ref: "SA105 box 27",
    },
    CategoryDef {
        code: "costOfServices",
        name: "Costs of services provided",
        description: "Gardening, cleaning and other services including wages",
        hmrc_ref: "SA105 box 28",
    },
    CategoryDef {
        code: "otherPropertyExpenses",
        name: "Other allowable property expenses",
        description: "Allowable property expenses not covered elsewhere",
        hmrc_ref: "SA105 box 29",
    },
];

/// Property income categories.
pub const PROPERTY_INCOME: &[CategoryDef] = &[
    CategoryDef {
        code: "rentIncome",
        name: "Total rents and other income from property",
        description: "Rent received from tenants",
        hmrc_ref: "SA105 box 20",
    },
    CategoryDef {
        code: "otherPropertyIncome",
        name: "Other property income",
        description: "Premiums, reverse premiums and other receipts",
        hmrc_ref: "SA105 box 22",
    },
];

/// Look up a category definition by code across all namespaces.
pub fn category_def(code: &str) -> Option<&'static CategoryDef> {
    SELF_EMPLOYMENT_EXPENSES
        .iter()
        .chain(SELF_EMPLOYMENT_INCOME)
        .chain(PROPERTY_EXPENSES)
        .chain(PROPERTY_INCOME)
        .find(|def| def.code == code)
}

/// True if `code` names a catalog category.
pub fn is_known_category(code: &str) -> bool {
    category_def(code).is_some()
}

/// Keywords that vote for one category. Order within the table is the
/// scorer's tie-break order.
#[derive(Debug, Clone, Copy)]
pub struct KeywordSet {
    pub category: &'static str,
    pub keywords: &'static [&'static str],
}

/// Expense keyword tables, self-employment namespace first, then property.
pub const EXPENSE_KEYWORDS: &[KeywordSet] = &[
    KeywordSet {
        category: "costOfGoods",
        keywords: &[
            "stock",
            "wholesale",
            "supplier",
            "materials",
            "inventory",
            "goods for resale",
            "packaging",
        ],
    },
    KeywordSet {
        category: "paymentsToSubcontractors",
        keywords: &["subcontractor", "subbie", "cis deduction", "labour only"],
    },
    KeywordSet {
        category: "wagesAndStaff",
        keywords: &["salary", "wages", "payroll", "paye", "pension contribution", "staff"],
    },
    // Sets stay under 10 keywords so a single short hit (weight 1) still
    // clears the 0.1 normalized-score threshold.
    KeywordSet {
        category: "travelCosts",
        keywords: &[
            "fuel",
            "petrol",
            "diesel",
            "taxi",
            "train fare",
            "mileage",
            "parking",
            "hotel",
            "flight",
        ],
    },
    KeywordSet {
        category: "premisesCosts",
        keywords: &[
            "rent",
            "business rates",
            "electricity",
            "gas bill",
            "water rates",
            "utilities",
            "insurance",
            "heating",
        ],
    },
    KeywordSet {
        category: "maintenanceCosts",
        keywords: &["repair", "maintenance", "servicing", "spare parts"],
    },
    KeywordSet {
        category: "adminCosts",
        keywords: &[
            "stationery",
            "postage",
            "printing",
            "software",
            "phone",
            "mobile",
            "broadband",
            "internet",
            "hosting",
        ],
    },
    KeywordSet {
        category: "advertising",
        keywords: &[
            "advertising",
            "marketing",
            "website",
            "seo",
            "promotion",
            "google ads",
            "facebook ads",
            "sponsorship",
        ],
    },
    KeywordSet {
        category: "interestOnLoans",
        keywords: &["loan interest", "loan repayment interest", "interest charged"],
    },
    KeywordSet {
        category: "financialCharges",
        keywords: &[
            "bank charge",
            "bank fee",
            "overdraft",
            "card fee",
            "transaction fee",
            "currency conversion",
            "merchant fee",
        ],
    },
    KeywordSet {
        category: "badDebts",
        keywords: &["bad debt", "written off", "write off"],
    },
    KeywordSet {
        category: "professionalFees",
        keywords: &[
            "accountant",
            "accountancy",
            "solicitor",
            "legal fees",
            "consultant",
            "bookkeeping",
            "surveyor",
        ],
    },
    KeywordSet {
        category: "depreciation",
        keywords: &["depreciation"],
    },
    // Property namespace
    KeywordSet {
        category: "rentRatesAndInsurance",
        keywords: &["ground rent", "landlord insurance", "council tax", "service charge"],
    },
    KeywordSet {
        category: "propertyRepairs",
        keywords: &["property repair", "plumber", "electrician", "boiler", "decorating"],
    },
    KeywordSet {
        category: "loanInterest",
        keywords: &["mortgage interest", "btl mortgage"],
    },
    KeywordSet {
        category: "legalAndManagementFees",
        keywords: &["letting agent", "management fee", "tenancy agreement", "inventory check"],
    },
    KeywordSet {
        category: "costOfServices",
        keywords: &["gardening", "cleaning", "window cleaner"],
    },
];

/// Income keyword tables.
pub const INCOME_KEYWORDS: &[KeywordSet] = &[
    KeywordSet {
        category: "turnover",
        keywords: &["invoice", "sales", "client payment", "fees received", "takings"],
    },
    KeywordSet {
        category: "otherBusinessIncome",
        keywords: &["grant", "rebate", "commission received"],
    },
    KeywordSet {
        category: "rentIncome",
        keywords: &["rent received", "tenant", "rental income"],
    },
    KeywordSet {
        category: "otherPropertyIncome",
        keywords: &["lease premium", "deposit retained"],
    },
];

/// A group of non-allowable keywords with its HMRC guidance text.
#[derive(Debug, Clone, Copy)]
pub struct NonAllowableSet {
    /// Machine tag for the group (used in explanations).
    pub tag: &'static str,
    pub keywords: &'static [&'static str],
    pub guidance: &'static str,
}

/// Non-allowable keyword groups, checked first-match-wins in this order.
pub const NON_ALLOWABLE: &[NonAllowableSet] = &[
    NonAllowableSet {
        tag: "personal",
        keywords: &[
            "groceries",
            "tesco",
            "sainsbury",
            "asda",
            "aldi",
            "lidl",
            "waitrose",
            "morrisons",
            "netflix",
            "spotify",
            "gym membership",
            "haircut",
            "holiday",
            "clothes shopping",
            "personal",
        ],
        guidance: "Personal expenses are not allowable against business profits \
                   (BIM37007: expenditure must be wholly and exclusively for the trade)",
    },
    NonAllowableSet {
        tag: "fines",
        keywords: &["parking fine", "speeding", "penalty charge", "fine", "hmrc penalty"],
        guidance: "Fines and penalties for breaking the law are not allowable (BIM42515)",
    },
    NonAllowableSet {
        tag: "entertainment",
        keywords: &["client entertainment", "entertaining clients", "hospitality"],
        guidance: "Business entertainment of clients is specifically disallowed (BIM45000)",
    },
    NonAllowableSet {
        tag: "donations",
        keywords: &["donation", "charity", "political party"],
        guidance: "Donations are generally not allowable as trading expenses; \
                   Gift Aid relief may apply instead",
    },
    NonAllowableSet {
        tag: "dividends",
        keywords: &["dividend", "drawings", "owner withdrawal"],
        guidance: "Drawings and dividends are appropriations of profit, not expenses",
    },
];

/// Terms that suggest personal spend without being an exact non-allowable
/// hit. Combined with an amount threshold in the secondary heuristic.
pub const PERSONAL_LIKE_TERMS: &[&str] =
    &["gift", "birthday", "wedding", "family", "friend", "treat"];

/// Keywords that indicate capital rather than revenue expenditure.
pub const CAPITAL_KEYWORDS: &[&str] = &[
    "building",
    "land purchase",
    "machinery",
    "vehicle purchase",
    "extension",
    "roof",
    "structural",
    "freehold",
];

/// Asset terms that, with a large amount, suggest capital expenditure even
/// without an explicit capital keyword.
pub const EQUIPMENT_TERMS: &[&str] = &[
    "equipment",
    "machinery",
    "computer",
    "laptop",
    "printer",
    "server",
    "camera",
];

/// Amount above which the equipment/personal heuristics engage.
pub const LARGE_AMOUNT_THRESHOLD: f64 = 500.0;

/// Mixed-use triggers and their apportionment guidance.
#[derive(Debug, Clone, Copy)]
pub struct MixedUseRule {
    pub trigger: &'static str,
    pub guidance: &'static str,
}

pub const MIXED_USE: &[MixedUseRule] = &[
    MixedUseRule {
        trigger: "home office",
        guidance: "Use of home: claim the business proportion of household costs, \
                   or HMRC simplified expenses flat rate",
    },
    MixedUseRule {
        trigger: "mobile",
        guidance: "Mobile phone: apportion between business and personal call/data use",
    },
    MixedUseRule {
        trigger: "phone",
        guidance: "Phone costs: apportion between business and personal use",
    },
    MixedUseRule {
        trigger: "broadband",
        guidance: "Broadband: claim the business-use proportion of the line",
    },
    MixedUseRule {
        trigger: "internet",
        guidance: "Internet: claim the business-use proportion of the line",
    },
    MixedUseRule {
        trigger: "car",
        guidance: "Vehicle costs: apportion by business mileage, or use HMRC \
                   simplified mileage rates",
    },
];

/// Per-business-type rule entry: primary categories, cost-of-goods
/// expectation, and advisory expense-to-turnover ratio ranges.
#[derive(Debug, Clone, Copy)]
pub struct BusinessTypeRule {
    pub business_type: BusinessType,
    /// Categories this business type typically uses. The candidate set is
    /// this list plus the always-permitted generic categories.
    pub primary_expenses: &'static [&'static str],
    pub requires_cost_of_goods: bool,
    /// Advisory (category, low, high) expense-to-turnover ratio ranges.
    /// Never enforced as hard constraints.
    pub typical_ratios: &'static [(&'static str, f64, f64)],
}

/// Generic categories every business type may use regardless of its primary
/// list.
pub const ALWAYS_PERMITTED: &[&str] =
    &["adminCosts", "professionalFees", "financialCharges", "other"];

pub const BUSINESS_TYPE_RULES: &[BusinessTypeRule] = &[
    BusinessTypeRule {
        business_type: BusinessType::Retail,
        primary_expenses: &[
            "costOfGoods",
            "premisesCosts",
            "wagesAndStaff",
            "advertising",
            "maintenanceCosts",
        ],
        requires_cost_of_goods: true,
        typical_ratios: &[("costOfGoods", 0.4, 0.7), ("premisesCosts", 0.05, 0.2)],
    },
    BusinessTypeRule {
        business_type: BusinessType::Wholesale,
        primary_expenses: &["costOfGoods", "travelCosts", "premisesCosts", "wagesAndStaff"],
        requires_cost_of_goods: true,
        typical_ratios: &[("costOfGoods", 0.5, 0.8), ("travelCosts", 0.02, 0.1)],
    },
    BusinessTypeRule {
        business_type: BusinessType::Services,
        primary_expenses: &["travelCosts", "advertising", "wagesAndStaff", "premisesCosts"],
        requires_cost_of_goods: false,
        typical_ratios: &[("adminCosts", 0.05, 0.2), ("travelCosts", 0.02, 0.15)],
    },
    BusinessTypeRule {
        business_type: BusinessType::Construction,
        primary_expenses: &[
            "paymentsToSubcontractors",
            "costOfGoods",
            "travelCosts",
            "maintenanceCosts",
        ],
        requires_cost_of_goods: true,
        typical_ratios: &[
            ("paymentsToSubcontractors", 0.2, 0.6),
            ("costOfGoods", 0.2, 0.5),
        ],
    },
    BusinessTypeRule {
        business_type: BusinessType::Property,
        primary_expenses: &[
            "rentRatesAndInsurance",
            "propertyRepairs",
            "loanInterest",
            "legalAndManagementFees",
            "costOfServices",
            "otherPropertyExpenses",
        ],
        requires_cost_of_goods: false,
        typical_ratios: &[("propertyRepairs", 0.1, 0.4), ("loanInterest", 0.1, 0.5)],
    },
    BusinessTypeRule {
        business_type: BusinessType::Freelancer,
        primary_expenses: &["travelCosts", "advertising"],
        requires_cost_of_goods: false,
        typical_ratios: &[("adminCosts", 0.05, 0.25), ("travelCosts", 0.02, 0.15)],
    },
];

/// Look up the rule entry for a business type.
pub fn business_type_rule(business_type: BusinessType) -> Option<&'static BusinessTypeRule> {
    BUSINESS_TYPE_RULES
        .iter()
        .find(|rule| rule.business_type == business_type)
}

//! Functional modules of the application and their API route prefixes.
//!
//! Every module is served under `/api/<segment>`; requests are mapped back
//! to a module by matching the first path segment after `/api/` exactly.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::RbacError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Module {
    #[serde(rename = "Applicant_Details")]
    ApplicantDetails,
    #[serde(rename = "Tasks")]
    Tasks,
    #[serde(rename = "Comments")]
    Comments,
    #[serde(rename = "Relationships")]
    Relationships,
    #[serde(rename = "Home_Visit")]
    HomeVisit,
    #[serde(rename = "Financial_Assistance")]
    FinancialAssistance,
    #[serde(rename = "Food_Assistance")]
    FoodAssistance,
    #[serde(rename = "Attachments")]
    Attachments,
    #[serde(rename = "Programs")]
    Programs,
    #[serde(rename = "Financial_Assessment")]
    FinancialAssessment,
    #[serde(rename = "Applicant_Income")]
    ApplicantIncome,
    #[serde(rename = "Applicant_Expense")]
    ApplicantExpense,
    #[serde(rename = "Employee")]
    Employee,
    #[serde(rename = "Inventory_Items")]
    InventoryItems,
    #[serde(rename = "Inventory_Transactions")]
    InventoryTransactions,
    #[serde(rename = "Supplier_Profile")]
    SupplierProfile,
    #[serde(rename = "Center_Detail")]
    CenterDetail,
}

impl Module {
    pub const ALL: [Module; 17] = [
        Module::ApplicantDetails,
        Module::Tasks,
        Module::Comments,
        Module::Relationships,
        Module::HomeVisit,
        Module::FinancialAssistance,
        Module::FoodAssistance,
        Module::Attachments,
        Module::Programs,
        Module::FinancialAssessment,
        Module::ApplicantIncome,
        Module::ApplicantExpense,
        Module::Employee,
        Module::InventoryItems,
        Module::InventoryTransactions,
        Module::SupplierProfile,
        Module::CenterDetail,
    ];

    /// Canonical module name, as used in the role matrix.
    pub fn name(&self) -> &'static str {
        match self {
            Module::ApplicantDetails => "Applicant_Details",
            Module::Tasks => "Tasks",
            Module::Comments => "Comments",
            Module::Relationships => "Relationships",
            Module::HomeVisit => "Home_Visit",
            Module::FinancialAssistance => "Financial_Assistance",
            Module::FoodAssistance => "Food_Assistance",
            Module::Attachments => "Attachments",
            Module::Programs => "Programs",
            Module::FinancialAssessment => "Financial_Assessment",
            Module::ApplicantIncome => "Applicant_Income",
            Module::ApplicantExpense => "Applicant_Expense",
            Module::Employee => "Employee",
            Module::InventoryItems => "Inventory_Items",
            Module::InventoryTransactions => "Inventory_Transactions",
            Module::SupplierProfile => "Supplier_Profile",
            Module::CenterDetail => "Center_Detail",
        }
    }

    /// Path segment under `/api`.
    pub fn segment(&self) -> &'static str {
        match self {
            Module::ApplicantDetails => "applicantDetails",
            Module::Tasks => "tasks",
            Module::Comments => "comments",
            Module::Relationships => "relationships",
            Module::HomeVisit => "homeVisit",
            Module::FinancialAssistance => "financialAssistance",
            Module::FoodAssistance => "foodAssistance",
            Module::Attachments => "attachments",
            Module::Programs => "programs",
            Module::FinancialAssessment => "financialAssessment",
            Module::ApplicantIncome => "applicantIncome",
            Module::ApplicantExpense => "applicantExpense",
            Module::Employee => "employee",
            Module::InventoryItems => "inventoryItems",
            Module::InventoryTransactions => "inventoryTransactions",
            Module::SupplierProfile => "supplierProfile",
            Module::CenterDetail => "centerDetail",
        }
    }

    pub fn route(&self) -> String {
        format!("/api/{}", self.segment())
    }

    /// Resolves the module a request path belongs to.
    ///
    /// Accepts full paths (`/api/tasks/12`), bare prefixes (`/api/tasks`) and
    /// paths already stripped of the `/api` prefix (`/tasks`).
    pub fn from_route(path: &str) -> Option<Module> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_start_matches('/');
        let rest = trimmed.strip_prefix("api/").unwrap_or(trimmed);
        let segment = rest.split('/').next().unwrap_or_default();

        if segment.is_empty() {
            return None;
        }

        Module::ALL.into_iter().find(|m| m.segment() == segment)
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Module {
    type Err = RbacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Module::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s) || m.segment() == s)
            .ok_or_else(|| RbacError::UnknownModule(s.to_string()))
    }
}

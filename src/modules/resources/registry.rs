//! Table definitions for every module served by the generic resource routes.

use caseflow_rbac::{Module, RoleId};

use super::model::ColumnType::{BigInt, Boolean, Date, Integer, Numeric, Text};
use super::model::{CenterScope, ResourceDef, col};

/// Case work: open to every role; the role table narrows it further.
const CASE_ROLES: &[RoleId] = &RoleId::ALL;

/// Organisation management: caseworkers are not admitted at all.
const STAFF_ROLES: &[RoleId] = &[
    RoleId::AppAdmin,
    RoleId::Hq,
    RoleId::OrgAdmin,
    RoleId::OrgExecutive,
];

/// Staff records are closed to executives as well.
const EMPLOYEE_ROLES: &[RoleId] = &[RoleId::AppAdmin, RoleId::Hq, RoleId::OrgAdmin];

pub static RESOURCES: [ResourceDef; 17] = [
    ResourceDef {
        module: Module::ApplicantDetails,
        table: "applicant_details",
        columns: &[
            col("file_number", Text),
            col("name", Text),
            col("surname", Text),
            col("id_number", Text),
            col("cell_number", Text),
            col("alternate_number", Text),
            col("email_address", Text),
            col("street_address", Text),
            col("marital_status", Text),
            col("employment_status", Text),
            col("highest_education_level", Text),
            col("dwelling_type", Text),
            col("dwelling_status", Text),
            col("file_status", Text),
            col("file_condition", Text),
            col("date_intake", Date),
            col("popia_agreement", Boolean),
        ],
        filters: &["file_status", "file_number"],
        searchable: &["name", "surname", "id_number", "file_number"],
        scope: CenterScope::TenantColumn,
        allowed_roles: CASE_ROLES,
        include_unassigned_when_filtered: false,
    },
    ResourceDef {
        module: Module::Tasks,
        table: "tasks",
        columns: &[
            col("file_id", Integer),
            col("task_description", Text),
            col("date_required", Date),
            col("status", Text),
        ],
        filters: &["file_id", "status"],
        searchable: &["task_description"],
        scope: CenterScope::TenantColumn,
        allowed_roles: CASE_ROLES,
        include_unassigned_when_filtered: true,
    },
    ResourceDef {
        module: Module::Comments,
        table: "comments",
        columns: &[
            col("file_id", Integer),
            col("comment", Text),
            col("comment_date", Date),
        ],
        filters: &["file_id"],
        searchable: &["comment"],
        scope: CenterScope::TenantColumn,
        allowed_roles: CASE_ROLES,
        include_unassigned_when_filtered: false,
    },
    ResourceDef {
        module: Module::Relationships,
        table: "relationships",
        columns: &[
            col("file_id", Integer),
            col("relationship_type", Text),
            col("name", Text),
            col("surname", Text),
            col("id_number", Text),
            col("date_of_birth", Date),
            col("gender", Text),
            col("employment_status", Text),
            col("health_condition", Text),
        ],
        filters: &["file_id", "relationship_type"],
        searchable: &["name", "surname", "id_number"],
        scope: CenterScope::TenantColumn,
        allowed_roles: CASE_ROLES,
        include_unassigned_when_filtered: false,
    },
    ResourceDef {
        module: Module::HomeVisit,
        table: "home_visit",
        columns: &[
            col("file_id", Integer),
            col("visit_date", Date),
            col("representative", Text),
            col("comments", Text),
        ],
        filters: &["file_id", "visit_date"],
        searchable: &["representative", "comments"],
        scope: CenterScope::TenantColumn,
        allowed_roles: CASE_ROLES,
        include_unassigned_when_filtered: false,
    },
    ResourceDef {
        module: Module::FinancialAssistance,
        table: "financial_assistance",
        columns: &[
            col("file_id", Integer),
            col("assistance_type", Text),
            col("financial_amount", Numeric),
            col("date_of_assistance", Date),
            col("assisted_by", Text),
            col("sector", Text),
            col("program", Text),
        ],
        filters: &["file_id", "assistance_type"],
        searchable: &["assistance_type", "assisted_by"],
        scope: CenterScope::TenantColumn,
        allowed_roles: CASE_ROLES,
        include_unassigned_when_filtered: false,
    },
    ResourceDef {
        module: Module::FoodAssistance,
        table: "food_assistance",
        columns: &[
            col("file_id", Integer),
            col("distributed_date", Date),
            col("hamper_type", Text),
            col("financial_cost", Numeric),
            col("assisted_by", Text),
        ],
        filters: &["file_id", "hamper_type"],
        searchable: &["hamper_type", "assisted_by"],
        scope: CenterScope::TenantColumn,
        allowed_roles: CASE_ROLES,
        include_unassigned_when_filtered: false,
    },
    ResourceDef {
        module: Module::Attachments,
        table: "attachments",
        columns: &[
            col("file_id", Integer),
            col("attachment_name", Text),
            col("attachment_details", Text),
            col("file_url", Text),
            col("mime_type", Text),
            col("file_size", BigInt),
        ],
        filters: &["file_id"],
        searchable: &["attachment_name", "attachment_details"],
        scope: CenterScope::TenantColumn,
        allowed_roles: CASE_ROLES,
        include_unassigned_when_filtered: false,
    },
    ResourceDef {
        module: Module::Programs,
        table: "programs",
        columns: &[
            col("person_trained_id", Integer),
            col("program_name", Text),
            col("means_of_communication", Text),
            col("date_of_program", Date),
            col("communicated_by", Text),
            col("training_level", Text),
            col("training_provider", Text),
            col("program_outcome", Text),
        ],
        filters: &["person_trained_id"],
        searchable: &["program_name", "training_provider"],
        scope: CenterScope::TenantColumn,
        allowed_roles: CASE_ROLES,
        include_unassigned_when_filtered: false,
    },
    ResourceDef {
        module: Module::FinancialAssessment,
        table: "financial_assessment",
        columns: &[
            col("file_id", Integer),
            col("total_income", Numeric),
            col("total_expenses", Numeric),
            col("disposable_income", Numeric),
        ],
        filters: &["file_id"],
        searchable: &[],
        scope: CenterScope::TenantColumn,
        allowed_roles: CASE_ROLES,
        include_unassigned_when_filtered: false,
    },
    ResourceDef {
        module: Module::ApplicantIncome,
        table: "applicant_income",
        columns: &[
            col("financial_assessment_id", Integer),
            col("income_type", Text),
            col("amount", Numeric),
            col("description", Text),
        ],
        filters: &["financial_assessment_id"],
        searchable: &["income_type", "description"],
        scope: CenterScope::TenantColumn,
        allowed_roles: CASE_ROLES,
        include_unassigned_when_filtered: false,
    },
    ResourceDef {
        module: Module::ApplicantExpense,
        table: "applicant_expense",
        columns: &[
            col("financial_assessment_id", Integer),
            col("expense_type", Text),
            col("amount", Numeric),
            col("description", Text),
        ],
        filters: &["financial_assessment_id"],
        searchable: &["expense_type", "description"],
        scope: CenterScope::TenantColumn,
        allowed_roles: CASE_ROLES,
        include_unassigned_when_filtered: false,
    },
    ResourceDef {
        module: Module::Employee,
        table: "employee",
        columns: &[
            col("name", Text),
            col("surname", Text),
            col("id_number", Text),
            col("gender", Text),
            col("email", Text),
            col("contact_number", Text),
            col("department", Text),
            col("hseq_related", Boolean),
            col("start_date", Date),
            col("username", Text),
        ],
        filters: &["department"],
        searchable: &["name", "surname", "email"],
        scope: CenterScope::TenantColumn,
        allowed_roles: EMPLOYEE_ROLES,
        include_unassigned_when_filtered: false,
    },
    ResourceDef {
        module: Module::InventoryItems,
        table: "inventory_items",
        columns: &[
            col("item_name", Text),
            col("description", Text),
            col("unit", Text),
            col("quantity", Numeric),
            col("min_stock", Numeric),
            col("cost_per_unit", Numeric),
            col("supplier_id", Integer),
        ],
        filters: &["supplier_id"],
        searchable: &["item_name", "description"],
        scope: CenterScope::TenantColumn,
        allowed_roles: STAFF_ROLES,
        include_unassigned_when_filtered: false,
    },
    ResourceDef {
        module: Module::InventoryTransactions,
        table: "inventory_transactions",
        columns: &[
            col("item_id", Integer),
            col("transaction_type", Text),
            col("quantity", Numeric),
            col("transaction_date", Date),
            col("file_id", Integer),
            col("notes", Text),
        ],
        filters: &["item_id", "transaction_type", "file_id"],
        searchable: &["notes"],
        scope: CenterScope::TenantColumn,
        allowed_roles: STAFF_ROLES,
        include_unassigned_when_filtered: false,
    },
    ResourceDef {
        module: Module::SupplierProfile,
        table: "supplier_profile",
        columns: &[
            col("name", Text),
            col("registration_no", Text),
            col("contact_person", Text),
            col("contact_email", Text),
            col("contact_phone", Text),
            col("address", Text),
            col("category", Text),
            col("status", Text),
        ],
        filters: &["category", "status"],
        searchable: &["name", "contact_person"],
        scope: CenterScope::TenantColumn,
        allowed_roles: STAFF_ROLES,
        include_unassigned_when_filtered: false,
    },
    ResourceDef {
        module: Module::CenterDetail,
        table: "center_detail",
        columns: &[
            col("organisation_name", Text),
            col("organisation_short_name", Text),
            col("registration_number", Text),
            col("contact_number", Text),
            col("email_address", Text),
            col("address", Text),
            col("website", Text),
        ],
        filters: &[],
        searchable: &["organisation_name", "organisation_short_name"],
        scope: CenterScope::PrimaryKey,
        allowed_roles: STAFF_ROLES,
        include_unassigned_when_filtered: false,
    },
];

pub fn find(module: Module) -> Option<&'static ResourceDef> {
    RESOURCES.iter().find(|def| def.module == module)
}

#[cfg(test)]
mod tests {
    use super::*;
    use caseflow_db::validate_identifier;

    #[test]
    fn test_every_module_has_exactly_one_table() {
        for module in Module::ALL {
            let count = RESOURCES.iter().filter(|d| d.module == module).count();
            assert_eq!(count, 1, "{} should have one resource definition", module);
        }
    }

    #[test]
    fn test_identifiers_are_valid() {
        for def in &RESOURCES {
            assert!(validate_identifier(def.table).is_ok(), "{}", def.table);
            for column in def.columns {
                assert!(validate_identifier(column.name).is_ok(), "{}", column.name);
            }
        }
    }

    #[test]
    fn test_filters_and_search_reference_writable_columns() {
        for def in &RESOURCES {
            for name in def.filters.iter().chain(def.searchable) {
                assert!(
                    def.column(name).is_some(),
                    "{}: {} is not a column",
                    def.table,
                    name
                );
            }
        }
    }

    #[test]
    fn test_center_detail_is_scoped_on_its_key() {
        let def = find(Module::CenterDetail).unwrap();
        assert_eq!(def.scope, CenterScope::PrimaryKey);
        assert!(!def.allowed_roles.contains(&RoleId::OrgCaseworker));
    }

    #[test]
    fn test_sortable_columns() {
        let def = find(Module::Tasks).unwrap();
        assert!(def.is_sortable("created_at", "center_id"));
        assert!(def.is_sortable("date_required", "center_id"));
        assert!(def.is_sortable("center_id", "center_id"));
        assert!(!def.is_sortable("password_hash", "center_id"));
    }

    #[test]
    fn test_employee_excludes_executives() {
        let def = find(Module::Employee).unwrap();
        assert!(!def.allowed_roles.contains(&RoleId::OrgExecutive));
        assert!(!def.allowed_roles.contains(&RoleId::OrgCaseworker));
        assert!(def.allowed_roles.contains(&RoleId::OrgAdmin));

        let def = find(Module::InventoryItems).unwrap();
        assert!(def.allowed_roles.contains(&RoleId::OrgExecutive));
    }
}

//! Table and field identifiers agreed with the external record store.
//!
//! These strings exist only at the gateway boundary; the rest of the
//! system addresses records through the typed models in `crate::model`.

pub mod tasks {
    pub const TABLE: &str = "tasks";
    pub const ID: &str = "id";
    pub const TITLE: &str = "title";
    pub const DESCRIPTION: &str = "description";
    pub const DUE_DATE: &str = "due_date";
    pub const PRIORITY: &str = "priority";
    pub const STATUS: &str = "status";
    pub const ASSIGNED_TO: &str = "assigned_to";
    pub const CREATED_AT: &str = "created_at";

    pub const COLUMNS: &[&str] = &[
        ID,
        TITLE,
        DESCRIPTION,
        DUE_DATE,
        PRIORITY,
        STATUS,
        ASSIGNED_TO,
        CREATED_AT,
    ];
}

pub mod projects {
    pub const TABLE: &str = "projects";
    pub const ID: &str = "id";
    pub const NAME: &str = "name";
    pub const DESCRIPTION: &str = "description";
    pub const START_DATE: &str = "start_date";
    pub const END_DATE: &str = "end_date";
    pub const STATUS: &str = "status";

    pub const COLUMNS: &[&str] = &[ID, NAME, DESCRIPTION, START_DATE, END_DATE, STATUS];
}

pub mod users {
    pub const TABLE: &str = "users";
    pub const ID: &str = "id";
    pub const NAME: &str = "name";
    pub const EMAIL: &str = "email";
    pub const ROLE: &str = "role";

    pub const COLUMNS: &[&str] = &[ID, NAME, EMAIL, ROLE];
}

pub mod links {
    pub const TABLE: &str = "task_projects";
    pub const ID: &str = "id";
    pub const TASK_ID: &str = "task_id";
    pub const PROJECT_ID: &str = "project_id";

    pub const COLUMNS: &[&str] = &[ID, TASK_ID, PROJECT_ID];
}

//! Diesel table definitions for the PostgreSQL schema.
//!
//! These must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// CPU architectures offered at registration.
    architectures (id) {
        id -> Int4,
        name -> Varchar,
    }
}

diesel::table! {
    operating_systems (id) {
        id -> Int4,
        distro -> Varchar,
        version -> Varchar,
        codename -> Varchar,
    }
}

diesel::table! {
    /// Registered screenshot factories.
    ///
    /// `name` carries the `factories_name_key` unique constraint.
    factories (id) {
        id -> Int4,
        name -> Varchar,
        /// Owning user.
        admin_id -> Uuid,
        architecture_id -> Int4,
        operating_system_id -> Int4,
        /// Null until the first poll.
        last_poll -> Nullable<Timestamptz>,
        uploads_per_day -> Int4,
        created -> Timestamptz,
    }
}

diesel::table! {
    browser_groups (id) {
        id -> Int4,
        name -> Varchar,
    }
}

diesel::table! {
    engines (id) {
        id -> Int4,
        name -> Varchar,
    }
}

diesel::table! {
    javascript_versions (id) {
        id -> Int4,
        version -> Varchar,
    }
}

diesel::table! {
    java_versions (id) {
        id -> Int4,
        version -> Varchar,
    }
}

diesel::table! {
    flash_versions (id) {
        id -> Int4,
        version -> Varchar,
    }
}

diesel::table! {
    /// Browser installations; lookup columns are resolved in batches.
    browsers (id) {
        id -> Int4,
        factory_id -> Int4,
        browser_group_id -> Int4,
        version -> Varchar,
        engine_id -> Int4,
        engine_version -> Varchar,
        javascript_id -> Nullable<Int4>,
        java_id -> Nullable<Int4>,
        flash_id -> Nullable<Int4>,
        command -> Nullable<Varchar>,
        active -> Bool,
    }
}

diesel::table! {
    websites (id) {
        id -> Int4,
        url -> Text,
        /// Content-safety score compared against `profanities_allowed`.
        profanities -> Int4,
    }
}

diesel::table! {
    screenshots (id) {
        id -> Int4,
        factory_id -> Int4,
        browser_id -> Int4,
        website_id -> Int4,
        width -> Int4,
        height -> Int4,
        created -> Timestamptz,
    }
}

diesel::table! {
    problem_reports (id) {
        id -> Int4,
        screenshot_id -> Int4,
        code -> Int4,
        message -> Text,
        reported -> Timestamptz,
    }
}

diesel::table! {
    factory_screen_sizes (factory_id, width, height) {
        factory_id -> Int4,
        width -> Int4,
        height -> Int4,
    }
}

diesel::table! {
    factory_color_depths (factory_id, bits_per_pixel) {
        factory_id -> Int4,
        bits_per_pixel -> Int4,
    }
}

diesel::joinable!(factories -> architectures (architecture_id));
diesel::joinable!(factories -> operating_systems (operating_system_id));
diesel::joinable!(screenshots -> websites (website_id));
diesel::joinable!(problem_reports -> screenshots (screenshot_id));

diesel::allow_tables_to_appear_in_same_query!(
    architectures,
    operating_systems,
    factories,
    browser_groups,
    engines,
    javascript_versions,
    java_versions,
    flash_versions,
    browsers,
    websites,
    screenshots,
    problem_reports,
    factory_screen_sizes,
    factory_color_depths,
);

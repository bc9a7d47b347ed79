//! Almanac calendar backend - integration test support.
//!
//! Re-exports the workspace crates under one roof so the HTTP tests can use
//! `almanac_test::` paths for everything they seed and call.

pub mod component {
    pub use almanac_service::{
        access_key, auth, calendar, custom_field, event, scope, sub_calendar, validation,
    };

    pub mod db {
        pub use almanac_db::db::*;

        pub mod connection {
            pub use almanac_app::db_handler::DbProviderHandler;
            pub use almanac_db::db::connection::*;
        }
    }

    pub mod model {
        pub use almanac_db::model::*;
    }

    pub mod config {
        pub use almanac_app::config::ConfigHandler;
        pub use almanac_core::config::*;
    }
}

pub mod app {
    pub use almanac_app::*;

    pub mod api {
        pub use almanac_app::app::api::*;
    }
}

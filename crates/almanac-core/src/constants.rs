/// Route component constants shared across crates
pub const API_ROUTE_COMPONENT: &str = "api";
pub const API_ROUTE_PREFIX: &str = const_str::concat!("/", API_ROUTE_COMPONENT);

pub const AUTH_ROUTE_COMPONENT: &str = "auth";
pub const AUTH_ROUTE_PREFIX: &str =
    const_str::concat!(API_ROUTE_PREFIX, "/", AUTH_ROUTE_COMPONENT);

pub const APP_ROUTE_COMPONENT: &str = "app";
pub const APP_ROUTE_PREFIX: &str = const_str::concat!(API_ROUTE_PREFIX, "/", APP_ROUTE_COMPONENT);

pub const V1_ROUTE_COMPONENT: &str = "v1";
pub const V1_ROUTE_PREFIX: &str = const_str::concat!(API_ROUTE_PREFIX, "/", V1_ROUTE_COMPONENT);

/// Length limit applied to every user-supplied name and title.
pub const MAX_NAME_LENGTH: usize = 255;

/// Minimum length of an account password.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Number of random bytes behind a bearer token (43 url-safe characters).
pub const API_TOKEN_BYTES: usize = 32;

/// Number of random bytes behind an access key (40 url-safe characters).
pub const ACCESS_KEY_BYTES: usize = 30;

pub const DEFAULT_TIMEZONE: &str = "UTC";
pub const DEFAULT_SUB_CALENDAR_COLOR: &str = "#000000";

/// Length limit applied to free-text custom field values.
pub const MAX_FIELD_VALUE_LENGTH: usize = 65_535;

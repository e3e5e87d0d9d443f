pub mod invocation;
pub mod site;

pub use invocation::{
    CHANGE_ICON_FLAG, FORCE_FLAG, ICON_PATH_FLAG, Invocation, PARENT_PID_FLAG, PatchRequest,
    TARGET_EXE_FLAG,
};
pub use site::{CATALOG_ICON_PREFIX, DEFAULT_ICON_SENTINEL, IconRef, Site, capitalize_first};

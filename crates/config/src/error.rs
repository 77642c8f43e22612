pub use apiconf_common::error::{Error, Result};

apiconf_common::impl_context!();

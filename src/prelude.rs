pub use std::{collections::HashMap, sync::Arc, time::Duration};

pub use chrono::{DateTime, Utc};
pub use tracing::{debug, error, info, trace, warn};

pub use crate::error::{Error, Result};

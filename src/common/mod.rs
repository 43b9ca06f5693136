// src/common/mod.rs

// --- Declare all public modules within common ---
pub mod checksum;
pub mod error;
pub mod hal_traits;
pub mod message;
pub mod timing;
pub mod types;

// --- Re-export key types/traits/functions for easier access ---

// From checksum.rs
pub use checksum::{seal, sum, verify};

// From error.rs
pub use error::{Sm70Error, WireError};

// From hal_traits.rs
pub use hal_traits::{Sm70Clock, Sm70Serial};

// From message.rs
pub use message::{
    DataReport, SensorInfoReport, DATA_REQUEST_FRAME, SENSOR_INFO_REQUEST_FRAME,
};

// From timing.rs (constants - users can access via common::timing::*)
pub use timing::SM70_BAUD;

// From types.rs
pub use types::{DisplayFormat, SensorStatus};

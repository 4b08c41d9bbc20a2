pub mod access;
pub mod activity;
pub mod enums;
pub mod facility;
pub mod filters;
pub mod geography;
pub mod household;
pub mod lab;
pub mod maternal;
pub mod programs;
pub mod referral;
pub mod staff;
pub mod supply;
pub mod surveillance;
pub mod validation;

pub use access::*;
pub use activity::*;
pub use facility::*;
pub use filters::*;
pub use geography::*;
pub use household::*;
pub use lab::*;
pub use maternal::*;
pub use programs::*;
pub use referral::*;
pub use staff::*;
pub use supply::*;
pub use surveillance::*;
pub use validation::{Validate, ValidationError};

//! Fire Gateway Core
//!
//! This crate contains:
//! - Configuration
//! - Error types
//! - The media tree builder
//! - The gateway facade called by the HTTP layer

pub mod config;
pub mod error;
pub mod gateway;
pub mod network;
pub mod tree;

pub use config::{GatewayConfig, GeneralConfig, LoggingConfig, MetadataConfig};
pub use error::GatewayError;
pub use gateway::{Gateway, Listing, MarkerList, ServeTarget, ShareLink, Status};
pub use tree::{TreeBuilder, TreeNode};

pub use fire_fs::{FileEntry, RelativePath, ResolvedPath};
pub use fire_store::{LessonPlan, Marker, Slide, SlotValue, TagMap, ANNOTATED_TAG};

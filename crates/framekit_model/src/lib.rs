// SPDX-License-Identifier: MIT OR Apache-2.0
//! Entity loaders for framekit documents.
//!
//! This crate turns parsed document elements into entities:
//! - Models, which own one frame graph per document
//! - Links, the rigid bodies
//! - Joints and their axes
//! - Lights
//!
//! ## Architecture
//!
//! Loading is built on:
//! - A generic [`Element`] tree with typed attribute access
//! - Accumulated [`Diagnostic`]s instead of early failure
//! - A [`FrameBinding`] per entity that owns its vertex in the graph

pub mod element;
pub mod error;
pub mod settings;
pub mod utils;
pub mod frame;
pub mod joint_axis;
pub mod joint;
pub mod link;
pub mod light;
pub mod model;

pub use element::{Element, ElementPtr, FromValue, Value};
pub use error::{Diagnostic, Diagnostics, ErrorCode, PoseError};
pub use settings::{LoaderSettings, DEFAULT_ROOT_FRAME, SETTINGS_FORMAT_VERSION};
pub use frame::FrameBinding;
pub use joint_axis::JointAxis;
pub use joint::{Joint, JointType, UnknownJointType};
pub use link::Link;
pub use light::{Light, LightType, UnknownLightType};
pub use model::Model;

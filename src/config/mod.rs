// src/config/mod.rs
//! Runtime configuration: site/content settings and the remote tutor.

pub mod site;
pub mod tutor;

pub use site::SiteConfig;
pub use tutor::TutorConfig;

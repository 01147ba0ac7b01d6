//! Groups: named composites of parts.
//!
//! A [`GroupDefinition`] is assembled once by the [`GroupDefinitionBuilder`] and
//! shared by reference from then on. It carries the registered parts, the wiring
//! between them, an optional [`ScheduleDefinition`] and the group's external
//! surface: at most one [`GroupExportDefinition`] and any number of
//! [`GroupImportDefinition`]s. The [`GroupImportEngine`] decides which groups can
//! satisfy which group imports.

mod definition ;
mod schedule ;
mod builder ;
mod import_engine ;

pub use definition::{ GroupDefinition, GroupPartDefinition, GroupExportDefinition, GroupImportDefinition };
pub use schedule::{ ScheduleDefinition, InsertionPointDefinition };
pub use builder::{ GroupDefinitionBuilder, GroupBuildError, RegisteredPart };
pub use import_engine::{ GroupImportEngine, CONTRACT_CRITERION, GROUP_CRITERION };

// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod dataset;
pub mod ids;
pub mod model;
pub mod record;
pub mod state;
pub mod table;
pub mod window;
pub mod workflow;

pub use dataset::*;
pub use ids::*;
pub use model::*;
pub use record::*;
pub use state::*;
pub use table::*;
pub use window::*;
pub use workflow::*;

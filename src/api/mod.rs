// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod errors;
pub mod handlers;
pub mod http_server;
pub mod manifest;

pub use errors::{ApiError, ErrorResponse};
pub use handlers::{CatalogResponse, HealthResponse, MetaResponse, StreamsResponse};
pub use http_server::{create_router, start_server, AppState};
pub use manifest::Manifest;

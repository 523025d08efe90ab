// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Media discovery: full-text search over CMS media metadata, backed by
//! PostgreSQL or Meilisearch.

pub mod app;
pub mod error;
pub mod models;
pub mod services;

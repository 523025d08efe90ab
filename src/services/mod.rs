// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

pub mod backend;
pub mod event_worker;
pub mod logging;
pub mod meilisearch;
pub mod metadata_client;
pub mod postgres;
pub mod query;
pub mod reindex;
pub mod search_service;
pub mod synchronizer;

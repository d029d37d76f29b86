// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations: frame sources, crop export and annotation storage.

pub mod export;
pub mod media;
pub mod repository;
pub mod serialization;

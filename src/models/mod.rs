// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation data model: geometry, ROI state, points and records.

pub mod annotation;
pub mod points;
pub mod record;
pub mod roi;
pub mod session;

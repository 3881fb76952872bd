// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

pub mod compression;
pub mod encoding;
pub mod io;
pub mod misc;
pub mod sqlite;

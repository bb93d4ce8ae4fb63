//! Unit tests for the `cevennes-fetch` entry point.

use super::*;

//! Integration tests for Trending-Harvester

mod harvest_tests;

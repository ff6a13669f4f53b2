//! Tandem - Couples Retrospective Conversation Engine
//!
//! This crate implements the turn-taking conversation protocol behind a
//! couples' retrospective: AI-generated reflection questions, per-partner
//! answers, AI enrichment of each round, and a final conversation summary,
//! persisted to a backing store and mirrored to a local cache for resume.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

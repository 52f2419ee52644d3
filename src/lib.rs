//! # docsift
//!
//! Session-scoped lexical retrieval over uploaded documents.
//!
//! A user uploads PDFs into an ephemeral session and asks questions; the
//! engine surfaces the most relevant passages. Retrieval is purely
//! lexical — diacritic-folded term matching, optionally weighted by
//! corpus-relative tf-idf — with no persistent index: the corpus is
//! rebuilt from the session's documents on every query.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌───────────┐   ┌──────────────────────────────┐
//! │ Uploads  │──▶│  Store    │──▶│  Engine (pure, per-request)  │
//! │ (PDFs)   │   │ sessions  │   │ normalize → segment → score  │
//! └──────────┘   └───────────┘   │      → rank → snippet        │
//!                                └──────┬───────────────────────┘
//!                       ┌──────────────┤
//!                       ▼              ▼
//!                  ┌──────────┐   ┌──────────┐
//!                  │   CLI    │   │   HTTP   │
//!                  │  (sift)  │   │  (chat)  │
//!                  └──────────┘   └──────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`normalize`] | Case/diacritic folding and tokenization |
//! | [`segment`] | Sentence-aware overlapping chunker |
//! | [`corpus`] | Per-session unit assembly |
//! | [`score`] | Overlap / occurrence / tf-idf scoring |
//! | [`rank`] | Deterministic top-k ranking |
//! | [`snippet`] | Match-centered excerpt rendering |
//! | [`search`] | Query orchestration |
//! | [`extract`] | PDF page-text extraction |
//! | [`store`] | Session/file store |
//! | [`augment`] | Optional answer-generation provider |
//! | [`server`] | HTTP chat API |

pub mod augment;
pub mod config;
pub mod corpus;
pub mod extract;
pub mod models;
pub mod normalize;
pub mod rank;
pub mod score;
pub mod search;
pub mod segment;
pub mod server;
pub mod snippet;
pub mod store;

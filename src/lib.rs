pub mod catalog;
pub mod cli;
pub mod client;
pub mod commands;
pub mod complaint;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod mutation;
pub mod offline;
pub mod pagination;
pub mod remote;
pub mod storage;
pub mod store;
pub mod types;

pub use catalog::{Catalog, CatalogCache, Category, SubCategory};
pub use client::{CivicClient, SubmitOutcome};
pub use complaint::{Comment, Complaint, GeoPoint, NewComplaint, is_valid_complaint_number};
pub use config::Config;
pub use error::{CivicError, ErrorKind, LastError, Result};
pub use lifecycle::{allowed_targets, can_transition, transition};
pub use mutation::MutationEngine;
pub use offline::{Draft, OfflineQueue, PendingSubmission, SyncFailure, SyncReport};
pub use pagination::{FetchOutcome, PaginationEngine};
pub use remote::{ComplaintDetail, ComplaintGateway, HttpGateway, Page};
pub use storage::{DurableStore, FileStore, MemoryStore};
pub use store::{ComplaintStore, ViewSnapshot};
pub use types::{
    ALL_VIEWS, Actor, ComplaintFilter, ComplaintStatus, ComplaintView, PageMeta, Priority, Role,
    VALID_PRIORITIES, VALID_ROLES, VALID_STATUSES, VALID_VIEWS,
};

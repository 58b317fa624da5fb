//! HTTP layer for restbulk
//!
//! The sync engine never talks to the network directly. It goes through the
//! [`HttpClient`] trait, which this crate implements on top of
//! `reqwest::blocking`. Tests substitute in-memory implementations.

pub mod client;
pub mod config;
pub mod error;
pub mod request;
pub mod response;

pub use client::{HttpClient, ReqwestClient};
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use request::{Method, Request};
pub use response::{Link, ParsedResponse, Response, parse_link_header};
pub use reqwest::Url;

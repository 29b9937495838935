//! # WCQ — Wide-Column SELECT Core
//!
//! WCQ는 wide-column 테이블에 대한 SELECT 문의 컴파일과 결과 재구성을 담당하는 코어입니다.
//! 파서가 만든 raw statement를 테이블 레이아웃에 대해 검증하고, 스토리지 스캔 범위를
//! 계산하며, 스토리지가 돌려준 물리 셀을 논리 행으로 되돌립니다.
//!
//! ## 빠른 시작
//!
//! ```rust
//! use std::sync::Arc;
//! use wcq_core::schema::{FieldType, IndexedFields, Kind, TableLayout};
//! use wcq_core::select::{RawStatement, Relation, SelectCompiler, Term};
//! use wcq_core::storage::{Cell, Row};
//!
//! # fn main() -> wcq_core::WcqResult<()> {
//! let layout = Arc::new(
//!     TableLayout::builder("timeline", Kind::Dynamic, "user", FieldType::Utf8)
//!         .clustering("posted", FieldType::Utf8)
//!         .value("body", FieldType::Utf8)
//!         .build()?,
//! );
//!
//! let raw = RawStatement::new("timeline")
//!     .filter(Relation::eq("user", Term::literal("u1")))
//!     .limit(10);
//! let stmt = SelectCompiler::new().compile(&raw, layout, &IndexedFields::new())?;
//!
//! // 스토리지 레이어에 넘길 스캔 범위
//! assert!(!stmt.is_key_range());
//! assert!(stmt.is_column_range());
//!
//! // 스토리지가 돌려준 셀을 논리 행으로 재구성
//! let rows = vec![Row::new("u1", vec![Cell::live("2024-01-01", "hello", 1)])];
//! let result = stmt.process(&rows)?;
//! assert_eq!(result.rows[0].value("body"), Some(b"hello".as_slice()));
//! # Ok(())
//! # }
//! ```
//!
//! ## 처리 파이프라인
//!
//! ```text
//! RawStatement → SelectCompiler → SelectStatement
//!          → key_bounds / requested_columns / requested_bounds → (storage)
//!          → process(rows) → ResultSet → RecordBatch
//! ```
//!
//! ## 모듈 구조
//!
//! - [`select`] — 컴파일러, 스캔 범위 계산, 행 재구성
//! - [`schema`] — 테이블 레이아웃과 필드 타입
//! - [`codec`] — composite 셀 이름과 counter 값 코덱
//! - [`storage`] — 스토리지 레이어가 돌려주는 물리 행/셀
//! - [`config`] — 식별자 규칙 등 컴파일러 설정

pub mod codec;
pub mod config;
pub mod error;
pub mod operator;
pub mod schema;
pub mod select;
pub mod storage;

// Logging utilities
pub mod logging;

// Re-export commonly used types
pub use config::{IdentifierCase, SelectConfig};
pub use error::{WcqError, WcqResult};
pub use operator::Operator;
pub use schema::{FieldType, Kind, TableLayout};
pub use select::{RawStatement, ResultSet, SelectCompiler, SelectStatement};

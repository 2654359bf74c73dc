//! URL 安全检查
//!
//! 创建短链接前对目标 URL 做信誉查询：
//! - MetaDefender URL lookup（默认）
//! - 关闭检查时使用 PassThroughVerifier

mod metadefender;
mod provider;

pub use metadefender::MetaDefenderVerifier;
pub use provider::{PassThroughVerifier, SafetyVerifier, Verdict, VerifierError, build_verifier};

//! 環境変数の宣言

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 環境変数の宣言
///
/// 値そのものはマニフェストには書かず、名前のみを宣言します。
/// 値はデプロイとは別の経路でプロビジョニングされます。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    /// 必須の環境変数名
    #[serde(default)]
    pub required: Vec<String>,
    /// 任意の環境変数名とそのデフォルト値
    #[serde(default)]
    pub optional: BTreeMap<String, String>,
}

impl Environment {
    pub fn is_empty(&self) -> bool {
        self.required.is_empty() && self.optional.is_empty()
    }
}

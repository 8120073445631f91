use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 検証済み JWT の payload
///
/// - payload を丸ごと保持する (FramerAuth は `first_name` / `last_name` など任意の claim を載せてくる)
/// - 署名検証と `aud` チェックを両方通過したものだけが `AuthGate` から返される
/// - middleware が request extensions に入れ、handler は `JwtPayload` extractor で受け取る
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);

impl Claims {
    /// `aud` が文字列のときだけ返す (配列の `aud` は単一サイト前提のこのサービスでは扱わない)
    pub fn aud(&self) -> Option<&str> {
        self.get_str("aud")
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }
}

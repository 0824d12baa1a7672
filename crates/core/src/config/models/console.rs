use serde::{Deserialize, Serialize};

/// 执行日志流所在的远程API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// 流地址模板，`{id}` 替换为执行日志ID
    pub stream_path: String,
    pub auth_token: Option<String>,
    pub connect_timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            stream_path: "/monitor/jobLog/stream/{id}".to_string(),
            auth_token: None,
            connect_timeout_seconds: 10,
        }
    }
}

impl ApiConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(anyhow::anyhow!(
                "API地址必须以 http:// 或 https:// 开头: {}",
                self.base_url
            ));
        }

        if !self.stream_path.contains("{id}") {
            return Err(anyhow::anyhow!(
                "流地址模板必须包含 {{id}} 占位符: {}",
                self.stream_path
            ));
        }

        if self.connect_timeout_seconds == 0 {
            return Err(anyhow::anyhow!("连接超时时间必须大于0"));
        }

        Ok(())
    }

    /// 展开指定执行日志的流地址
    pub fn stream_url(&self, job_log_id: i64) -> String {
        let path = self.stream_path.replace("{id}", &job_log_id.to_string());
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// 调度预览配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// 预览的执行次数
    pub count: usize,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self { count: 5 }
    }
}

impl PreviewConfig {
    pub const MAX_COUNT: usize = 100;

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.count == 0 || self.count > Self::MAX_COUNT {
            return Err(anyhow::anyhow!(
                "预览次数必须在 1..={} 之间，当前值: {}",
                Self::MAX_COUNT,
                self.count
            ));
        }
        Ok(())
    }
}

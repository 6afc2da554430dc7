use std::time::Duration;

use reqwest::ClientBuilder;

use crate::config::HttpConfig;

fn has_proxy_env() -> bool {
    [
        "HTTPS_PROXY",
        "https_proxy",
        "HTTP_PROXY",
        "http_proxy",
        "ALL_PROXY",
        "all_proxy",
    ]
    .iter()
    .any(|k| std::env::var(k).is_ok_and(|v| !v.trim().is_empty()))
}

fn should_bypass_proxy_impl(url: &str, no_proxy_hosts: &[String], proxy_env_present: bool) -> bool {
    if !proxy_env_present || no_proxy_hosts.is_empty() {
        return false;
    }

    let Ok(u) = reqwest::Url::parse(url) else {
        return false;
    };
    let Some(host) = u.host_str() else {
        return false;
    };

    // ".example.com" 匹配子域名；"example.com" 只匹配自身
    no_proxy_hosts.iter().any(|entry| {
        let entry = entry.trim();
        if entry.is_empty() {
            false
        } else if entry.starts_with('.') {
            host.ends_with(entry)
        } else {
            host == entry
        }
    })
}

pub fn maybe_disable_proxy(builder: ClientBuilder, url: &str, cfg: &HttpConfig) -> ClientBuilder {
    if should_bypass_proxy_impl(url, &cfg.no_proxy_hosts, has_proxy_env()) {
        builder.no_proxy()
    } else {
        builder
    }
}

// 每次调用创建新的 client，不跨请求复用连接
pub fn client_for_url(url: &str, cfg: &HttpConfig) -> Result<reqwest::Client, reqwest::Error> {
    let builder = reqwest::Client::builder()
        .timeout(Duration::from_secs(cfg.timeout_secs))
        .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .pool_max_idle_per_host(0);
    maybe_disable_proxy(builder, url, cfg).build()
}

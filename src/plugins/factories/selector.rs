// 工厂选择器
// 把配置中的版本号或别名映射到具体工厂

use crate::kernel::PluginFactory;
use crate::plugins::factories::{FactoryContext, PluginFactoryV1, PluginFactoryV2};
use std::sync::Arc;
use tracing::{info, warn};

/// 版本别名表，匹配前先去空白并转小写
const VERSION_ALIASES: &[(&str, &str)] = &[
    ("1.0.0", PluginFactoryV1::VERSION),
    ("v1", PluginFactoryV1::VERSION),
    ("1", PluginFactoryV1::VERSION),
    ("local", PluginFactoryV1::VERSION),
    ("2.0.0", PluginFactoryV2::VERSION),
    ("v2", PluginFactoryV2::VERSION),
    ("2", PluginFactoryV2::VERSION),
    ("jwt", PluginFactoryV2::VERSION),
];

const AVAILABLE_VERSIONS: &[&str] = &[PluginFactoryV1::VERSION, PluginFactoryV2::VERSION];

/// 工厂选择器
pub struct FactorySelector;

impl FactorySelector {
    pub const DEFAULT_VERSION: &'static str = PluginFactoryV2::VERSION;

    /// 解析版本号或别名
    ///
    /// 缺省或无法识别时回退到默认版本，无法识别的输入会记录警告
    pub fn resolve_version(hint: Option<&str>) -> &'static str {
        let Some(raw) = hint.map(str::trim).filter(|h| !h.is_empty()) else {
            return Self::DEFAULT_VERSION;
        };

        let normalized = raw.to_lowercase();
        match VERSION_ALIASES
            .iter()
            .find(|(alias, _)| *alias == normalized)
        {
            Some((_, version)) => *version,
            None => {
                warn!(
                    requested = %raw,
                    fallback = Self::DEFAULT_VERSION,
                    "未知的插件版本，使用默认版本"
                );
                Self::DEFAULT_VERSION
            }
        }
    }

    /// 按版本提示创建工厂
    pub fn get_factory(hint: Option<&str>, context: FactoryContext) -> Arc<dyn PluginFactory> {
        let version = Self::resolve_version(hint);
        info!(requested = ?hint, version, "选择插件工厂");

        if version == PluginFactoryV1::VERSION {
            Arc::new(PluginFactoryV1::new(context))
        } else {
            Arc::new(PluginFactoryV2::new(context))
        }
    }

    pub fn get_available_versions() -> &'static [&'static str] {
        AVAILABLE_VERSIONS
    }

    /// 只接受完整版本号，别名不算
    pub fn is_version_available(version: &str) -> bool {
        AVAILABLE_VERSIONS.iter().any(|v| *v == version)
    }
}

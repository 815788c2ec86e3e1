// ==========================================
// 单元格日期转换器 - 读取转换 Trait
// ==========================================
// 职责: 定义行映射层调用的转换接口（不包含实现）
// 红线: 不做字段元数据查找，格式提示由调用方显式传入
// ==========================================

use crate::converter::error::ConvertResult;

// ==========================================
// FieldFormatHint - 字段级格式提示
// ==========================================
// 用途: 承载目标字段声明的日期格式模板
// 约定: 空白模板视同未声明
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldFormatHint(Option<String>);

impl FieldFormatHint {
    pub fn new(pattern: Option<String>) -> Self {
        Self(pattern.filter(|p| !p.trim().is_empty()))
    }

    /// 未声明格式模板
    pub fn none() -> Self {
        Self(None)
    }

    pub fn pattern(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn is_absent(&self) -> bool {
        self.0.is_none()
    }
}

impl From<&str> for FieldFormatHint {
    fn from(pattern: &str) -> Self {
        Self::new(Some(pattern.to_string()))
    }
}

impl From<Option<&str>> for FieldFormatHint {
    fn from(pattern: Option<&str>) -> Self {
        Self::new(pattern.map(str::to_string))
    }
}

// ==========================================
// ReadConverter Trait
// ==========================================
// 用途: 单元格文本 → 目标字段值
// 实现者: DateConverter
pub trait ReadConverter: Send + Sync {
    /// 转换结果类型
    type Output;

    /// 转换单元格文本
    ///
    /// # 参数
    /// - raw: 单元格原始文本（None 表示单元格不存在）
    /// - hint: 目标字段的格式提示
    ///
    /// # 返回
    /// - Ok(None): 空白单元格
    /// - Ok(Some(value)): 转换成功
    /// - Err: 输入格式错误，由调用方决定跳过该行或终止导入
    fn convert(
        &self,
        raw: Option<&str>,
        hint: &FieldFormatHint,
    ) -> ConvertResult<Option<Self::Output>>;
}

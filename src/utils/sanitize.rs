//! 路径组件清洗工具

/// Windows文件/文件夹名称中不允许的字符列表
const FORBIDDEN_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// 不允许被用作文件名的保留设备名
const RESERVED_NAMES: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// 最大文件名长度
const MAX_COMPONENT_LENGTH: usize = 255;

/// 将查询串或仓库名转化为可以安全用作文件/文件夹名称的字符串。
///
/// 路径分隔符和文件系统保留字符替换为下划线，去掉尾部的空格和点，
/// 保留设备名追加下划线，超长部分截断。
pub fn sanitize_component(input: &str) -> String {
    let mut out: String = input
        .chars()
        .map(|c| if FORBIDDEN_CHARS.contains(&c) { '_' } else { c })
        .collect();

    // 删除尾部的空格或点
    out = out.trim_end_matches([' ', '.']).to_string();

    if RESERVED_NAMES.contains(&out.to_uppercase().as_str()) {
        out.push('_');
    }

    if out.chars().count() > MAX_COMPONENT_LENGTH {
        out = out.chars().take(MAX_COMPONENT_LENGTH).collect();
    }

    out
}

/// 按字符数截断文本（不是字节数，避免切断多字节字符）
pub fn truncate_chars(input: &str, max_chars: usize) -> String {
    if input.chars().count() <= max_chars {
        input.to_string()
    } else {
        input.chars().take(max_chars).collect()
    }
}

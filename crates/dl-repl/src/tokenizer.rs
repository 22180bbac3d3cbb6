/*!
* 文件名: tokenizer.rs
* 作者: JQQ
* 创建日期: 2025/12/16
* 最后修改日期: 2025/12/16
* 版权: 2023 JQQ. All rights reserved.
* 依赖: None
* 描述: 输入行切分 / Input line splitting
*/

/// 将一行输入切分为命令和参数 / Split a line into a command and its arguments
///
/// 参数部分保留命令之后的原始空白，不再二次trim。
/// The argument part keeps the whitespace following the command verbatim.
///
/// e.g. `":a b c d ."` is split into `":a"` and `" b c d ."`
pub fn split_line(line: &str) -> (&str, &str) {
    let line = line.trim();

    match line.find(char::is_whitespace) {
        Some(end) => line.split_at(end),
        // 空行或只有命令 / Empty line or a bare command
        None => (line, ""),
    }
}

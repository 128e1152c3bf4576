//! HTML解析和处理模块
//!
//! - `utils`: 基础常量
//! - `parser`: `rel` 与 `srcset` 属性解析
//! - `dom`: 基础DOM操作
//! - `serializer`: 序列化功能
//! - `assets`: 属性、`<style>` 块与 `style` 属性中的资源本地化

pub mod assets;
pub mod dom;
pub mod parser;
pub mod serializer;
pub mod utils;

pub use assets::{localize_attributes, localize_style_attributes, localize_style_blocks};
pub use dom::{
    find_elements, find_nodes_by_name, get_node_attr, get_node_name, html_to_dom, remove_node,
    set_node_attr,
};
pub use parser::{parse_link_type, parse_srcset, LinkType, SrcSetItem};
pub use serializer::serialize_document;

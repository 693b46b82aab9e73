pub mod formatter;

pub use formatter::{
    format_age, format_breakdown, format_gpa, format_gpa_line, format_preset_detail,
    format_preset_list, should_use_colors,
};

//! Recursive walk over an object's lines that builds the control tree.

use super::{
    AlObject,
    control::{Control, ControlId, MultiLanguageEntry, Property, resolve_control},
    line::{classify, match_control, match_label, match_ml_property, match_property},
};
use crate::error::Error;

/// Parses lines from `start` on as children of `parent`.
///
/// `start_level` is the level of the line that opened `parent`; the scope ends
/// on the first line whose closing token brings the level back to it. Returns
/// the index of that closing line, or the line count when the input ends first.
pub fn parse_code(
    object: &mut AlObject,
    parent: ControlId,
    start: usize,
    start_level: i64,
    mut level: i64,
) -> Result<usize, Error> {
    let line_count = object.lines.len();
    let mut index = start;

    while index < line_count {
        let class = classify(&object.lines[index].code);
        if class.decrease {
            level -= 1;
            if level <= start_level {
                object.lines[index].indentation = level.max(0) as usize;
                return Ok(index);
            }
        }
        if class.increase {
            level += 1;
        }
        object.lines[index].indentation = level.max(0) as usize;

        let mut matched = !class.is_neutral();
        if !matched && !object.controls[parent].is_code {
            let code = object.lines[index].code.clone();
            if let Some(property) = match_property(&code) {
                object.controls[parent].properties.push(Property {
                    name: property.name,
                    value: property.value,
                    line_index: index,
                });
                matched = true;
            } else if let Some(ml) = match_ml_property(&code) {
                object.controls[parent].entries.push(MultiLanguageEntry::new(
                    ml.kind,
                    ml.name,
                    ml.attributes,
                    index,
                    parent,
                ));
                matched = true;
            } else if let Some(opener) = match_control(&code) {
                let spec = resolve_control(
                    object.object_type,
                    &opener.keyword,
                    &opener.args,
                    object.is_below_actions(parent),
                )?;
                let mut control = Control::new(spec.kind, spec.token, index);
                control.name = spec.name;
                control.secondary = spec.secondary;
                control.is_code = spec.is_code;
                control.parent = Some(parent);
                let id = object.controls.len();
                object.controls.push(control);
                object.controls[parent].children.push(id);

                let end = parse_code(object, id, index + 1, level, level)?;
                let end = end.min(line_count - 1);
                object.controls[id].end_line_index = end;
                index = end;
                matched = true;
            }
        }

        if !matched && let Some(label) = match_label(&object.lines[index].code) {
            object.controls[parent].entries.push(MultiLanguageEntry::new(
                label.kind,
                label.name,
                label.attributes,
                index,
                parent,
            ));
        }
        index += 1;
    }
    Ok(line_count)
}

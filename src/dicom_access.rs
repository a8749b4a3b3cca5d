use std::path::Path;

use dicom::core::value::Value;
use dicom::core::{PrimitiveValue, Tag};
use dicom::object::StandardDataDictionary;
use dicom::object::mem::InMemElement;
use dicom::object::{DefaultDicomObject, InMemDicomObject};
use tracing::{error, warn};

use crate::tags::describe;

/// Small helper trait to pull typed values from different DICOM object shapes.
pub trait ElementAccess {
    fn element_str(&self, tag: Tag) -> Option<String>;
    fn element_int(&self, tag: Tag) -> Option<i64>;
    fn has_element(&self, tag: Tag) -> bool;
    /// Present and non-empty (sequences need at least one item).
    fn has_value(&self, tag: Tag) -> bool;
    fn sequence_items(&self, tag: Tag) -> Option<&[InMemDicomObject]>;
    fn transfer_syntax(&self) -> Option<String>;
}

impl ElementAccess for DefaultDicomObject {
    fn element_str(&self, tag: Tag) -> Option<String> {
        (**self).element_str(tag)
    }

    fn element_int(&self, tag: Tag) -> Option<i64> {
        (**self).element_int(tag)
    }

    fn has_element(&self, tag: Tag) -> bool {
        self.element(tag).is_ok()
    }

    fn has_value(&self, tag: Tag) -> bool {
        (**self).has_value(tag)
    }

    fn sequence_items(&self, tag: Tag) -> Option<&[InMemDicomObject]> {
        (**self).sequence_items(tag)
    }

    fn transfer_syntax(&self) -> Option<String> {
        Some(trim_uid(self.meta().transfer_syntax()))
    }
}

impl ElementAccess for InMemDicomObject<StandardDataDictionary> {
    fn element_str(&self, tag: Tag) -> Option<String> {
        self.element(tag)
            .ok()
            .and_then(|e| e.to_str().ok())
            .map(|s| s.trim_end_matches(['\0', ' ']).to_string())
    }

    fn element_int(&self, tag: Tag) -> Option<i64> {
        self.element(tag).ok().and_then(|e| e.to_int::<i64>().ok())
    }

    fn has_element(&self, tag: Tag) -> bool {
        self.element(tag).is_ok()
    }

    fn has_value(&self, tag: Tag) -> bool {
        self.element(tag).map(element_has_value).unwrap_or(false)
    }

    fn sequence_items(&self, tag: Tag) -> Option<&[InMemDicomObject]> {
        self.element(tag).ok().and_then(|e| e.items())
    }

    fn transfer_syntax(&self) -> Option<String> {
        None
    }
}

pub fn element_has_value(elem: &InMemElement<StandardDataDictionary>) -> bool {
    match elem.value() {
        Value::Primitive(PrimitiveValue::Empty) => false,
        Value::Primitive(p @ PrimitiveValue::Str(_)) | Value::Primitive(p @ PrimitiveValue::Strs(_)) => {
            !p.to_str().trim_matches(['\0', ' ']).is_empty()
        }
        Value::Primitive(p) => p.calculate_byte_len() > 0,
        Value::Sequence(seq) => !seq.items().is_empty(),
        Value::PixelSequence(_) => true,
    }
}

/// UIDs coming out of meta headers may keep their null padding.
pub fn trim_uid(uid: &str) -> String {
    uid.trim_end_matches(['\0', ' ']).to_string()
}

/// String equality as used for unique keys: an empty side never matches.
pub fn same_value(a: &str, b: &str) -> bool {
    !a.is_empty() && !b.is_empty() && a == b
}

fn required_attribute_message(tag: Tag, file: &Path, empty: bool) {
    let what = if empty { "empty" } else { "missing" };
    error!(
        file = %file.display(),
        "required attribute {} {} in file: {}",
        describe(tag),
        what,
        file.display()
    );
}

pub(crate) fn unexpected_value_message(tag: Tag, file: &Path, as_error: bool) {
    if as_error {
        error!(
            file = %file.display(),
            "attribute {} has other value than expected in file: {}",
            describe(tag),
            file.display()
        );
    } else {
        warn!(
            file = %file.display(),
            "attribute {} has other value than expected in file: {}",
            describe(tag),
            file.display()
        );
    }
}

/// Tag present (possibly empty). Reports when `file` is given.
pub fn check_exists<T: ElementAccess + ?Sized>(dataset: &T, tag: Tag, file: Option<&Path>) -> bool {
    let found = dataset.has_element(tag);
    if !found {
        if let Some(file) = file {
            required_attribute_message(tag, file, false);
        }
    }
    found
}

pub fn check_exists_with_value<T: ElementAccess + ?Sized>(
    dataset: &T,
    tag: Tag,
    file: Option<&Path>,
) -> bool {
    if !check_exists(dataset, tag, file) {
        return false;
    }
    let valued = dataset.has_value(tag);
    if !valued {
        if let Some(file) = file {
            required_attribute_message(tag, file, true);
        }
    }
    valued
}

/// Exact string comparison after the existence check.
pub fn check_exists_with_string_value<T: ElementAccess + ?Sized>(
    dataset: &T,
    tag: Tag,
    expected: &str,
    file: Option<&Path>,
) -> bool {
    if !check_exists(dataset, tag, file) {
        return false;
    }
    let value = dataset.element_str(tag).unwrap_or_default();
    let matches = same_value(&value, expected);
    if !matches {
        if let Some(file) = file {
            unexpected_value_message(tag, file, true);
        }
    }
    matches
}

/// A mismatch only fails the check when `reject` is set; otherwise it is reported as a warning.
pub fn check_exists_with_integer_value<T: ElementAccess + ?Sized>(
    dataset: &T,
    tag: Tag,
    expected: i64,
    file: Option<&Path>,
    reject: bool,
) -> bool {
    check_exists_with_min_max_value(dataset, tag, expected, expected, file, reject)
}

pub fn check_exists_with_min_max_value<T: ElementAccess + ?Sized>(
    dataset: &T,
    tag: Tag,
    min: i64,
    max: i64,
    file: Option<&Path>,
    reject: bool,
) -> bool {
    if !check_exists(dataset, tag, file) {
        return false;
    }
    let in_range = dataset
        .element_int(tag)
        .map(|v| v >= min && v <= max)
        .unwrap_or(false);
    if in_range {
        return true;
    }
    if let Some(file) = file {
        unexpected_value_message(tag, file, reject);
    }
    !reject
}

#[cfg(test)]
mod tests {
    use super::*;
    use dicom::core::{DataElement, VR};

    fn dataset() -> InMemDicomObject {
        let mut obj = InMemDicomObject::new_empty();
        obj.put(DataElement::new(
            Tag(0x0028, 0x0010),
            VR::US,
            PrimitiveValue::from(600_u16),
        ));
        obj.put(DataElement::new(
            Tag(0x0008, 0x0060),
            VR::CS,
            PrimitiveValue::from("XA"),
        ));
        obj.put(DataElement::empty(Tag(0x0010, 0x0020), VR::LO));
        obj
    }

    #[test]
    fn existence_and_value_are_distinguished() {
        let obj = dataset();
        let file = Path::new("IMG1");
        assert!(check_exists(&obj, Tag(0x0010, 0x0020), Some(file)));
        assert!(!check_exists_with_value(&obj, Tag(0x0010, 0x0020), Some(file)));
        assert!(!check_exists(&obj, Tag(0x0010, 0x0010), None));
    }

    #[test]
    fn range_mismatch_only_fails_when_rejecting() {
        let obj = dataset();
        let rows = Tag(0x0028, 0x0010);
        assert!(!check_exists_with_min_max_value(&obj, rows, 1, 512, None, true));
        assert!(check_exists_with_min_max_value(&obj, rows, 1, 512, None, false));
        assert!(check_exists_with_min_max_value(&obj, rows, 1, 1024, None, true));
    }

    #[test]
    fn missing_attribute_short_circuits_value_checks() {
        let obj = dataset();
        // absent tags fail even when mismatches would be tolerated
        assert!(!check_exists_with_integer_value(&obj, Tag(0x0028, 0x0100), 8, None, false));
        assert!(check_exists_with_string_value(&obj, Tag(0x0008, 0x0060), "XA", None));
        assert!(!check_exists_with_string_value(&obj, Tag(0x0008, 0x0060), "CT", None));
    }

    #[test]
    fn empty_strings_never_match() {
        assert!(!same_value("", ""));
        assert!(same_value("1.2.3", "1.2.3"));
    }
}

//! PDF drawing operations for placing a captured page image

use crate::Result;
use crate::error::ExportError;
use crate::layout::Rect;
use crate::style::Color;
use lopdf::{
    Dictionary, Document, Object, ObjectId,
    content::{Content, Operation},
};
use tracing::{debug, trace};

/// Draw an image XObject into `rect` (PDF user space, bottom-left origin)
pub fn draw_image(name: &str, rect: Rect) -> Vec<Object> {
    vec![
        Object::Name(b"q".to_vec()),
        // Map the unit square onto the target rectangle
        Object::Name(b"cm".to_vec()),
        rect.width.into(),
        0.into(),
        0.into(),
        rect.height.into(),
        rect.x.into(),
        rect.y.into(),
        Object::Name(b"Do".to_vec()),
        Object::Name(name.as_bytes().to_vec()),
        Object::Name(b"Q".to_vec()),
    ]
}

/// Draw a filled rectangle
pub fn draw_rectangle_fill(rect: Rect, color: Color) -> Vec<Object> {
    vec![
        // Set fill color
        Object::Name(b"rg".to_vec()),
        color.r.into(),
        color.g.into(),
        color.b.into(),
        // Draw rectangle
        Object::Name(b"re".to_vec()),
        rect.x.into(),
        rect.y.into(),
        rect.width.into(),
        rect.height.into(),
        // Fill
        Object::Name(b"f".to_vec()),
    ]
}

/// Whether a name in an operation list is an operator rather than an operand
fn is_operator(name: &str) -> bool {
    matches!(
        name,
        // Graphics state
        "q" | "Q" | "cm" | "w"
        // Color
        | "rg" | "RG" | "g" | "G"
        // Path construction and painting
        | "m" | "l" | "re" | "h" | "S" | "f" | "n"
        // XObjects
        | "Do"
    )
}

/// Add operations to a page in the document
pub fn add_operations_to_page(
    doc: &mut Document,
    page_id: ObjectId,
    operations: Vec<Object>,
) -> Result<()> {
    debug!(
        "Adding {} operations to page {:?}",
        operations.len(),
        page_id
    );

    // Group the flat list into operator + operands
    let mut content_ops = Vec::new();
    let mut iter = operations.into_iter().peekable();
    while let Some(object) = iter.next() {
        let Object::Name(name) = object else {
            trace!("Skipping operand without an operator: {:?}", object);
            continue;
        };
        let operator = String::from_utf8_lossy(&name).to_string();
        if !is_operator(&operator) {
            trace!("Skipping name '{}' without an operator", operator);
            continue;
        }

        let mut operands = Vec::new();
        while let Some(next) = iter.peek() {
            if let Object::Name(next_name) = next {
                if is_operator(&String::from_utf8_lossy(next_name)) {
                    break;
                }
            }
            if let Some(operand) = iter.next() {
                operands.push(operand);
            }
        }
        content_ops.push(Operation::new(&operator, operands));
    }

    trace!("Converted to {} content operations", content_ops.len());
    let content = Content {
        operations: content_ops,
    };

    // Encode content and add to page
    let content_bytes = content.encode()?;
    doc.add_page_contents(page_id, content_bytes)?;

    Ok(())
}

/// Register `xobject_id` under `name` in the page's resources
pub fn register_xobject(
    doc: &mut Document,
    page_id: ObjectId,
    name: &str,
    xobject_id: ObjectId,
) -> Result<()> {
    // Resources are either inline or a reference to a shared dictionary
    let resources_ref = match doc.get_object(page_id) {
        Ok(Object::Dictionary(page)) => match page.get(b"Resources") {
            Ok(Object::Reference(id)) => Some(*id),
            _ => None,
        },
        _ => {
            return Err(ExportError::AssemblyError(format!(
                "Invalid page object {:?}",
                page_id
            )));
        }
    };

    let resources = match resources_ref {
        Some(id) => match doc.get_object_mut(id) {
            Ok(Object::Dictionary(resources)) => resources,
            _ => {
                return Err(ExportError::AssemblyError(
                    "Page resources are not a dictionary".to_string(),
                ));
            }
        },
        None => {
            let Ok(Object::Dictionary(page)) = doc.get_object_mut(page_id) else {
                return Err(ExportError::AssemblyError(format!(
                    "Invalid page object {:?}",
                    page_id
                )));
            };
            if !matches!(page.get(b"Resources"), Ok(Object::Dictionary(_))) {
                page.set("Resources", Dictionary::new());
            }
            match page.get_mut(b"Resources") {
                Ok(Object::Dictionary(resources)) => resources,
                _ => {
                    return Err(ExportError::AssemblyError(
                        "Page resources are not a dictionary".to_string(),
                    ));
                }
            }
        }
    };

    if !matches!(resources.get(b"XObject"), Ok(Object::Dictionary(_))) {
        resources.set("XObject", Dictionary::new());
    }
    if let Ok(Object::Dictionary(xobjects)) = resources.get_mut(b"XObject") {
        xobjects.set(name, xobject_id);
    }
    trace!("Registered XObject /{} -> {:?}", name, xobject_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    fn single_page() -> (Document, ObjectId) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        (doc, page_id)
    }

    #[test]
    fn test_operations_grouped_by_operator() {
        let (mut doc, page_id) = single_page();
        let mut ops = draw_rectangle_fill(Rect::new(0.0, 0.0, 10.0, 10.0), Color::white());
        ops.extend(draw_image("Im1", Rect::new(0.0, 0.0, 595.0, 842.0)));
        add_operations_to_page(&mut doc, page_id, ops).unwrap();

        let content = doc.get_and_decode_page_content(page_id).unwrap();
        let operators: Vec<&str> = content
            .operations
            .iter()
            .map(|op| op.operator.as_str())
            .collect();
        assert_eq!(operators, vec!["rg", "re", "f", "q", "cm", "Do", "Q"]);
        let do_op = &content.operations[5];
        assert_eq!(do_op.operands.len(), 1);
        assert_eq!(do_op.operands[0].as_name().unwrap(), b"Im1");
        assert_eq!(content.operations[4].operands.len(), 6);
    }

    #[test]
    fn test_register_xobject_creates_resources() {
        let (mut doc, page_id) = single_page();
        let image_id = doc.add_object(dictionary! { "Type" => "XObject" });
        register_xobject(&mut doc, page_id, "Im1", image_id).unwrap();

        let Ok(Object::Dictionary(page)) = doc.get_object(page_id) else {
            panic!("page missing");
        };
        let Ok(Object::Dictionary(resources)) = page.get(b"Resources") else {
            panic!("resources missing");
        };
        let Ok(Object::Dictionary(xobjects)) = resources.get(b"XObject") else {
            panic!("xobjects missing");
        };
        assert_eq!(
            xobjects.get(b"Im1").unwrap().as_reference().unwrap(),
            image_id
        );
    }

    #[test]
    fn test_register_xobject_follows_resource_reference() {
        let (mut doc, page_id) = single_page();
        let resources_id = doc.add_object(dictionary! {});
        if let Ok(Object::Dictionary(page)) = doc.get_object_mut(page_id) {
            page.set("Resources", resources_id);
        }
        let image_id = doc.add_object(dictionary! { "Type" => "XObject" });
        register_xobject(&mut doc, page_id, "Im1", image_id).unwrap();

        let Ok(Object::Dictionary(resources)) = doc.get_object(resources_id) else {
            panic!("resources missing");
        };
        assert!(matches!(resources.get(b"XObject"), Ok(Object::Dictionary(_))));
    }
}

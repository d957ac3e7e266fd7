//! Turning finished freehand drawings into text boxes or shapes.
//!
//! Both conversions keep the drawing's id and its place in the z-order, and
//! keep the box's top-left corner.

use crate::canvas::Canvas;
use crate::error::RecognitionError;
use crate::interaction::InputRequest;
use crate::objects::{CanvasObject, Drawing, ObjectId, Shape, ShapeKind};
use kurbo::Point;

/// Source of recognized handwriting.
///
/// Implementations may rasterize the stroke and hand it to an OCR service;
/// the canvas only sees the resulting text.
pub trait TextRecognizer {
    fn recognize(&self, drawing: &Drawing) -> Result<String, RecognitionError>;
}

impl<F> TextRecognizer for F
where
    F: Fn(&Drawing) -> Result<String, RecognitionError>,
{
    fn recognize(&self, drawing: &Drawing) -> Result<String, RecognitionError> {
        self(drawing)
    }
}

/// Result of [`Canvas::recognize_drawing`].
#[derive(Debug, Clone, PartialEq)]
pub enum ConvertOutcome {
    /// The drawing became a text box.
    Converted,
    /// Recognition failed; ask the user for the text.
    NeedInput(InputRequest),
    /// `id` is not a drawing.
    Refused,
}

impl Canvas {
    /// Replace drawing `id` with a text box holding `text`.
    ///
    /// The box is at least `text_min_width × text_min_height`. Clears the
    /// selection. Refused (false) when `id` is not a drawing.
    pub fn convert_drawing_to_text(&mut self, id: ObjectId, text: impl Into<String>) -> bool {
        let text = text.into();
        let (min_w, min_h) = (self.config.text_min_width, self.config.text_min_height);
        let converted = self.replace_drawing(id, |d| {
            let shape = Shape::new(id, Point::new(d.x, d.y), d.width.max(min_w), d.height.max(min_h));
            CanvasObject::Text(shape.with_text(text))
        });
        if converted {
            self.selection = None;
            log::debug!("Converted drawing {id} to text");
        }
        converted
    }

    /// Replace drawing `id` with a geometric shape of the same box, floored
    /// at the minimum object size.
    pub fn convert_drawing_to_shape(&mut self, id: ObjectId, kind: ShapeKind) -> bool {
        let min = self.config.min_object_size;
        let converted = self.replace_drawing(id, |d| {
            let shape = Shape::new(id, Point::new(d.x, d.y), d.width.max(min), d.height.max(min));
            CanvasObject::from_shape(kind, shape)
        });
        if converted {
            log::debug!("Converted drawing {id} to {kind:?}");
        }
        converted
    }

    /// Ask `recognizer` for the text of drawing `id` and convert it.
    ///
    /// On failure nothing changes and the caller gets a manual-text request
    /// to answer with [`Canvas::convert_drawing_to_text`].
    pub fn recognize_drawing(&mut self, id: ObjectId, recognizer: &dyn TextRecognizer) -> ConvertOutcome {
        let Some(drawing) = self.document.get(id).and_then(CanvasObject::as_drawing) else {
            return ConvertOutcome::Refused;
        };

        let recognized = recognizer.recognize(drawing).and_then(|text| {
            let text = text.trim().to_string();
            if text.is_empty() {
                Err(RecognitionError::Empty)
            } else {
                Ok(text)
            }
        });

        match recognized {
            Ok(text) => {
                self.convert_drawing_to_text(id, text);
                ConvertOutcome::Converted
            }
            Err(err) => {
                log::warn!("Recognition failed for drawing {id}: {err}");
                ConvertOutcome::NeedInput(InputRequest::ManualText {
                    id,
                    reason: err.to_string(),
                })
            }
        }
    }

    fn replace_drawing(&mut self, id: ObjectId, build: impl FnOnce(&Drawing) -> CanvasObject) -> bool {
        self.document.transact(|doc| {
            let Some(slot) = doc.get_mut(id) else {
                return false;
            };
            let replacement = match slot.as_drawing() {
                Some(drawing) => build(drawing),
                None => return false,
            };
            *slot = replacement;
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::ObjectKind;
    use kurbo::Rect;

    fn canvas_with_drawing(points: Vec<Point>) -> (Canvas, ObjectId) {
        let mut canvas = Canvas::new();
        let id = canvas.document.allocate_id();
        let drawing = Drawing::from_points(id, points).unwrap();
        canvas.document.add_object(CanvasObject::Drawing(drawing));
        (canvas, id)
    }

    #[test]
    fn test_convert_to_text_enforces_minimum_box() {
        let (mut canvas, id) = canvas_with_drawing(vec![Point::new(10.0, 10.0), Point::new(40.0, 20.0)]);
        canvas.select(id);
        assert!(canvas.convert_drawing_to_text(id, "hello"));

        let obj = canvas.document.get(id).unwrap();
        assert_eq!(obj.kind(), ObjectKind::Text);
        assert_eq!(obj.bounds(), Rect::new(10.0, 10.0, 110.0, 50.0));
        assert_eq!(obj.as_shape().unwrap().text.as_deref(), Some("hello"));
        assert!(canvas.selection.is_none());
    }

    #[test]
    fn test_convert_to_text_keeps_large_box() {
        let (mut canvas, id) = canvas_with_drawing(vec![Point::new(0.0, 0.0), Point::new(300.0, 120.0)]);
        assert!(canvas.convert_drawing_to_text(id, "big"));
        assert_eq!(canvas.document.get(id).unwrap().bounds(), Rect::new(0.0, 0.0, 300.0, 120.0));
    }

    #[test]
    fn test_convert_to_shape_floors_size() {
        let (mut canvas, id) = canvas_with_drawing(vec![Point::new(0.0, 0.0), Point::new(200.0, 10.0)]);
        assert!(canvas.convert_drawing_to_shape(id, ShapeKind::Circle));
        let obj = canvas.document.get(id).unwrap();
        assert_eq!(obj.kind(), ObjectKind::Circle);
        assert_eq!(obj.bounds(), Rect::new(0.0, 0.0, 200.0, 50.0));
    }

    #[test]
    fn test_conversion_keeps_z_order_and_is_undoable() {
        let (mut canvas, id) = canvas_with_drawing(vec![Point::new(0.0, 0.0), Point::new(80.0, 80.0)]);
        let top = canvas
            .document
            .add_object(CanvasObject::Rectangle(Shape::new(0, Point::ZERO, 10.0, 10.0)));
        assert!(canvas.convert_drawing_to_shape(id, ShapeKind::Triangle));
        assert_eq!(canvas.document.objects[0].id(), id);
        assert_eq!(canvas.document.objects[1].id(), top);

        assert!(canvas.undo());
        assert_eq!(canvas.document.get(id).unwrap().kind(), ObjectKind::Drawing);
    }

    #[test]
    fn test_non_drawing_is_refused() {
        let mut canvas = Canvas::new();
        let id = canvas
            .document
            .add_object(CanvasObject::Rectangle(Shape::new(0, Point::ZERO, 100.0, 100.0)));
        assert!(!canvas.convert_drawing_to_text(id, "x"));
        assert!(!canvas.convert_drawing_to_shape(id, ShapeKind::Circle));
        assert!(!canvas.convert_drawing_to_shape(999, ShapeKind::Circle));
        let ok = |_: &Drawing| Ok::<_, RecognitionError>("x".to_string());
        assert_eq!(canvas.recognize_drawing(id, &ok), ConvertOutcome::Refused);
        assert!(!canvas.document.can_undo());
    }

    #[test]
    fn test_recognition_success() {
        let (mut canvas, id) = canvas_with_drawing(vec![Point::new(0.0, 0.0), Point::new(50.0, 50.0)]);
        let recognizer = |d: &Drawing| {
            assert_eq!(d.len(), 2);
            Ok::<_, RecognitionError>(" hi there \n".to_string())
        };
        assert_eq!(canvas.recognize_drawing(id, &recognizer), ConvertOutcome::Converted);
        let shape = canvas.document.get(id).and_then(CanvasObject::as_shape).unwrap();
        assert_eq!(shape.text.as_deref(), Some("hi there"));
    }

    #[test]
    fn test_recognition_failure_asks_for_manual_text() {
        let (mut canvas, id) = canvas_with_drawing(vec![Point::new(0.0, 0.0), Point::new(50.0, 50.0)]);
        let failing = |_: &Drawing| Err::<String, _>(RecognitionError::Unavailable("offline".into()));
        let outcome = canvas.recognize_drawing(id, &failing);
        let ConvertOutcome::NeedInput(InputRequest::ManualText { id: asked, reason }) = outcome else {
            panic!("expected a manual text request, got {outcome:?}");
        };
        assert_eq!(asked, id);
        assert!(reason.contains("offline"));
        assert_eq!(canvas.document.get(id).unwrap().kind(), ObjectKind::Drawing);

        assert!(canvas.convert_drawing_to_text(asked, "typed"));
    }

    #[test]
    fn test_blank_recognition_counts_as_failure() {
        let (mut canvas, id) = canvas_with_drawing(vec![Point::new(0.0, 0.0)]);
        let blank = |_: &Drawing| Ok::<_, RecognitionError>("   ".to_string());
        assert!(matches!(
            canvas.recognize_drawing(id, &blank),
            ConvertOutcome::NeedInput(InputRequest::ManualText { .. })
        ));
    }
}

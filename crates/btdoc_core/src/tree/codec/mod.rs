use crate::tree::{
	AnimationCurve, ByteOrder, ByteWriter, Color, Cursor, DecodeError, FieldKind, FieldLayout, HostObject, Keyframe, Matrix4x4, Rect, Result, Value, Vector2, Vector3, Vector4,
};

/// Reads fixed-layout field payloads out of a layout's byte blob.
///
/// `order` applies to the integer family (ints, floats, doubles, longs, enums,
/// counts, ids, object indices, layer masks). Vectors, colors, rects,
/// matrices, and curves are always little-endian.
#[derive(Clone, Copy)]
pub(crate) struct FieldReader<'a> {
	layout: &'a FieldLayout,
	order: ByteOrder,
}

impl<'a> FieldReader<'a> {
	pub(crate) fn new(layout: &'a FieldLayout, order: ByteOrder) -> Self {
		Self { layout, order }
	}

	fn cursor(&self, slot: usize) -> Result<Cursor<'a>> {
		Cursor::at(&self.layout.bytes, self.layout.offset_of_slot(slot)?)
	}

	/// Stored 32-bit integer, used for counts and node ids.
	pub(crate) fn int(&self, slot: usize) -> Result<i32> {
		self.cursor(slot)?.read_i32(self.order)
	}

	/// Stored collection count.
	pub(crate) fn count(&self, slot: usize, max: usize) -> Result<usize> {
		let at = self.layout.offset_of_slot(slot)?;
		let raw = self.int(slot)?;
		let count = usize::try_from(raw).map_err(|_| DecodeError::NegativeCount { count: i64::from(raw), at })?;
		if count > max {
			return Err(DecodeError::CollectionTooLarge { count, max });
		}
		Ok(count)
	}

	/// Decode a scalar or fixed-layout value of `kind`.
	pub(crate) fn scalar(&self, kind: &FieldKind, slot: usize) -> Result<Value> {
		let order = self.order;
		let mut cur = self.cursor(slot)?;
		Ok(match kind {
			FieldKind::Int | FieldKind::Enum(_) => Value::Int(cur.read_i32(order)?),
			FieldKind::UInt => Value::UInt(cur.read_u32(order)?),
			FieldKind::Float => Value::Float(cur.read_f32(order)?),
			FieldKind::Double => Value::Double(cur.read_f64(order)?),
			FieldKind::Long => Value::Long(cur.read_i64(order)?),
			FieldKind::Bool => Value::Bool(cur.read_u8()? != 0),
			FieldKind::Byte => Value::Byte(cur.read_u8()?),
			FieldKind::LayerMask => Value::LayerMask(cur.read_i32(order)?),
			FieldKind::String => {
				let payload = self.layout.payload(slot)?;
				Value::String(String::from_utf8_lossy(payload).into_owned())
			}
			FieldKind::Vector2 => Value::Vector2(Vector2 {
				x: cur.read_f32_le()?,
				y: cur.read_f32_le()?,
			}),
			FieldKind::Vector3 => Value::Vector3(Vector3 {
				x: cur.read_f32_le()?,
				y: cur.read_f32_le()?,
				z: cur.read_f32_le()?,
			}),
			FieldKind::Vector4 => Value::Vector4(read_vector4(&mut cur)?),
			FieldKind::Quaternion => Value::Quaternion(read_vector4(&mut cur)?),
			FieldKind::Color => Value::Color(Color {
				r: cur.read_f32_le()?,
				g: cur.read_f32_le()?,
				b: cur.read_f32_le()?,
				a: cur.read_f32_le()?,
			}),
			FieldKind::Rect => Value::Rect(Rect {
				x: cur.read_f32_le()?,
				y: cur.read_f32_le()?,
				width: cur.read_f32_le()?,
				height: cur.read_f32_le()?,
			}),
			FieldKind::Matrix4x4 => {
				let mut cells = [0.0_f32; 16];
				for cell in &mut cells {
					*cell = cur.read_f32_le()?;
				}
				Value::Matrix4x4(Matrix4x4 { cells })
			}
			FieldKind::AnimationCurve => Value::AnimationCurve(read_curve(&mut cur)?),
			FieldKind::HostObject(_) => {
				let raw = cur.read_i32(order)?;
				usize::try_from(raw)
					.ok()
					.and_then(|idx| self.layout.objects.get(idx))
					.cloned()
					.map_or(Value::Null, Value::HostObject)
			}
			FieldKind::Array(_) | FieldKind::List(_) | FieldKind::Node(_) | FieldKind::Variable(_) | FieldKind::Struct(_) => {
				return Err(DecodeError::Unencodable {
					what: format!("{} as a scalar", kind.key_name()),
				});
			}
		})
	}
}

fn read_vector4(cur: &mut Cursor<'_>) -> Result<Vector4> {
	Ok(Vector4 {
		x: cur.read_f32_le()?,
		y: cur.read_f32_le()?,
		z: cur.read_f32_le()?,
		w: cur.read_f32_le()?,
	})
}

fn read_curve(cur: &mut Cursor<'_>) -> Result<AnimationCurve> {
	let at = cur.pos();
	let raw = cur.read_i32_le()?;
	let count = usize::try_from(raw).map_err(|_| DecodeError::NegativeCount { count: i64::from(raw), at })?;
	if count.saturating_mul(20) > cur.remaining() {
		return Err(DecodeError::UnexpectedEof {
			at: cur.pos(),
			need: count.saturating_mul(20),
			rem: cur.remaining(),
		});
	}
	let mut keys = Vec::with_capacity(count);
	for _ in 0..count {
		keys.push(Keyframe {
			time: cur.read_f32_le()?,
			value: cur.read_f32_le()?,
			in_tangent: cur.read_f32_le()?,
			out_tangent: cur.read_f32_le()?,
			tangent_mode: cur.read_i32_le()?,
		});
	}
	Ok(AnimationCurve {
		keys,
		pre_wrap_mode: cur.read_i32_le()?,
		post_wrap_mode: cur.read_i32_le()?,
	})
}

/// Encode a scalar or fixed-layout value of `kind`, mirroring [`FieldReader::scalar`].
pub(crate) fn write_scalar(out: &mut ByteWriter, kind: &FieldKind, value: &Value, order: ByteOrder) -> Result<()> {
	match (kind, value) {
		(FieldKind::Int | FieldKind::Enum(_), Value::Int(v)) => out.put_i32(*v, order),
		(FieldKind::UInt, Value::UInt(v)) => out.put_u32(*v, order),
		(FieldKind::Float, Value::Float(v)) => out.put_f32(*v, order),
		(FieldKind::Double, Value::Double(v)) => out.put_f64(*v, order),
		(FieldKind::Long, Value::Long(v)) => out.put_i64(*v, order),
		(FieldKind::Bool, Value::Bool(v)) => out.put_u8(u8::from(*v)),
		(FieldKind::Byte, Value::Byte(v)) => out.put_u8(*v),
		(FieldKind::LayerMask, Value::LayerMask(v)) => out.put_i32(*v, order),
		(FieldKind::String, Value::String(v)) => out.put_bytes(v.as_bytes()),
		(FieldKind::Vector2, Value::Vector2(v)) => put_floats(out, &[v.x, v.y]),
		(FieldKind::Vector3, Value::Vector3(v)) => put_floats(out, &[v.x, v.y, v.z]),
		(FieldKind::Vector4, Value::Vector4(v)) | (FieldKind::Quaternion, Value::Quaternion(v)) => put_floats(out, &[v.x, v.y, v.z, v.w]),
		(FieldKind::Color, Value::Color(v)) => put_floats(out, &[v.r, v.g, v.b, v.a]),
		(FieldKind::Rect, Value::Rect(v)) => put_floats(out, &[v.x, v.y, v.width, v.height]),
		(FieldKind::Matrix4x4, Value::Matrix4x4(v)) => put_floats(out, &v.cells),
		(FieldKind::AnimationCurve, Value::AnimationCurve(curve)) => {
			out.put_i32_le(i32::try_from(curve.keys.len()).map_err(|_| unencodable(kind, value))?);
			for key in &curve.keys {
				put_floats(out, &[key.time, key.value, key.in_tangent, key.out_tangent]);
				out.put_i32_le(key.tangent_mode);
			}
			out.put_i32_le(curve.pre_wrap_mode);
			out.put_i32_le(curve.post_wrap_mode);
		}
		(FieldKind::HostObject(_), Value::HostObject(HostObject { index, .. })) => {
			out.put_i32(i32::try_from(*index).map_err(|_| unencodable(kind, value))?, order);
		}
		_ => return Err(unencodable(kind, value)),
	}
	Ok(())
}

fn put_floats(out: &mut ByteWriter, values: &[f32]) {
	for value in values {
		out.put_f32_le(*value);
	}
}

pub(crate) fn unencodable(kind: &FieldKind, value: &Value) -> DecodeError {
	DecodeError::Unencodable {
		what: format!("{} value as {}", value.kind_label(), kind.key_name()),
	}
}

//! Descriptors derived from facet shapes.

use facet_core::{
    Def, Facet, FieldAttribute, FieldFlags, NumericType, PrimitiveType, Shape, StructKind, Type,
    UserType,
};

use crate::{
    Result, SerdeErrorKind,
    descriptor::{RawField, RecordType, TypeDescriptor},
    field::FieldAttrs,
};

impl TypeDescriptor {
    /// Descriptor of a facet type.
    pub fn of<'a, T: Facet<'a>>() -> Result<Self> {
        Self::from_shape(T::SHAPE)
    }

    /// Descriptor of a shape.
    ///
    /// Options, lists, sets and maps become their composite descriptors,
    /// tuples become fixed tuples and other structs become records named by
    /// their type identifier. Shapes with no descriptor (enums, pointers,
    /// ...) are unsupported.
    pub fn from_shape(shape: &'static Shape) -> Result<Self> {
        match shape.def {
            Def::Option(opt) => return Ok(Self::optional(Self::from_shape(opt.t())?)),
            Def::List(list) => return Ok(Self::list(Self::from_shape(list.t())?)),
            Def::Set(set) => return Ok(Self::set(Self::from_shape(set.t())?)),
            Def::Map(map) => {
                return Ok(Self::mapping(
                    Self::from_shape(map.k())?,
                    Self::from_shape(map.v())?,
                ));
            }
            _ => {}
        }

        if shape.type_identifier == "String" || shape.type_identifier == "&str" {
            return Ok(Self::str());
        }

        match &shape.ty {
            Type::Primitive(PrimitiveType::Boolean) => Ok(Self::bool()),
            Type::Primitive(PrimitiveType::Numeric(NumericType::Integer { .. })) => Ok(Self::int()),
            Type::Primitive(PrimitiveType::Numeric(NumericType::Float)) => Ok(Self::float()),
            Type::Primitive(PrimitiveType::Textual(_)) => Ok(Self::str()),
            Type::User(UserType::Struct(st)) if st.kind == StructKind::Tuple => {
                let items = st
                    .fields
                    .iter()
                    .map(|f| Self::from_shape(f.shape))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Self::tuple(items))
            }
            Type::User(UserType::Struct(_)) => Ok(Self::record(shape.type_identifier)),
            _ => Err(SerdeErrorKind::UnsupportedType(shape.type_identifier.to_string()).into()),
        }
    }
}

impl RecordType {
    /// Record type of a facet struct.
    pub fn of<'a, T: Facet<'a>>() -> Result<Self> {
        Self::from_shape(T::SHAPE)
    }

    /// Record type of a struct shape.
    ///
    /// `#[facet(flatten)]` and `#[facet(skip)]` carry over to the field
    /// attributes.
    pub fn from_shape(shape: &'static Shape) -> Result<Self> {
        let Type::User(UserType::Struct(struct_def)) = &shape.ty else {
            return Err(SerdeErrorKind::UnsupportedType(format!(
                "{} is not a struct",
                shape.type_identifier
            ))
            .into());
        };

        let mut record = RecordType::new(shape.type_identifier);
        for field in struct_def.fields {
            let mut attrs = FieldAttrs::new();
            if field.flags.contains(FieldFlags::FLATTEN) {
                attrs = attrs.flatten();
            }
            if field
                .attributes
                .contains(&FieldAttribute::Arbitrary("skip"))
            {
                attrs = attrs.skip(true);
            }

            let ty = TypeDescriptor::from_shape(field.shape)?;
            log::trace!("Field '{}' of {} is {ty}", field.name, shape.type_identifier);
            record = record.field(RawField::new(field.name, ty).with_attrs(attrs));
        }

        Ok(record)
    }
}

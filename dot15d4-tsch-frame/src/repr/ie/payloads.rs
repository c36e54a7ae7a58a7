use super::super::super::{NestedInformationElement, PayloadGroupId, PayloadInformationElement};
use super::super::super::{Error, Result};
use super::NestedInformationElementRepr;

use heapless::Vec;

/// A high-level representation of a Payload Information Element.
#[derive(Debug)]
pub enum PayloadInformationElementRepr {
    /// MAC sublayer Management Entity Information Elements.
    Mlme(Vec<NestedInformationElementRepr, 4>),
    /// Payload Termination.
    PayloadTermination,
}

impl PayloadInformationElementRepr {
    /// Parse a Payload Information Element.
    pub fn parse(ie: &PayloadInformationElement<&[u8]>) -> Result<Self> {
        Ok(match ie.group_id() {
            PayloadGroupId::Mlme => {
                let mut nested_information_elements = Vec::new();

                for nested_ie in ie.nested_information_elements() {
                    if nested_information_elements
                        .push(NestedInformationElementRepr::parse(&nested_ie)?)
                        .is_err()
                    {
                        break;
                    }
                }

                Self::Mlme(nested_information_elements)
            }
            PayloadGroupId::PayloadTermination => Self::PayloadTermination,
            _id => {
                #[cfg(feature = "panic")]
                {
                    panic!("unsupported Payload Information Element: {_id:?}");
                }
                #[allow(unreachable_code)]
                return Err(Error);
            }
        })
    }

    /// The buffer length required to emit the Payload Information Element.
    pub fn buffer_len(&self) -> usize {
        2 + self.inner_len()
    }

    /// The buffer length required to emit the inner part of the Payload
    /// Information Element.
    fn inner_len(&self) -> usize {
        match self {
            Self::Mlme(nested) => nested.iter().map(|ie| ie.buffer_len()).sum(),
            Self::PayloadTermination => 0,
        }
    }

    /// Emit the Payload Information Element into a buffer.
    pub fn emit(&self, w: &mut PayloadInformationElement<&mut [u8]>) {
        let id = PayloadGroupId::from(self);

        w.clear();
        w.set_length(self.inner_len() as u16);
        w.set_group_id(id);

        match self {
            Self::Mlme(nested) => {
                let mut offset = 0;
                let buffer = w.content_mut();

                for nested_ie in nested.iter() {
                    nested_ie.emit(&mut NestedInformationElement::new_unchecked(
                        &mut buffer[offset..][..nested_ie.buffer_len()],
                    ));
                    offset += nested_ie.buffer_len();
                }
            }
            Self::PayloadTermination => {}
        }
    }
}

impl From<&PayloadInformationElementRepr> for PayloadGroupId {
    fn from(value: &PayloadInformationElementRepr) -> Self {
        match value {
            PayloadInformationElementRepr::Mlme(_) => PayloadGroupId::Mlme,
            PayloadInformationElementRepr::PayloadTermination => PayloadGroupId::PayloadTermination,
        }
    }
}

#[cfg(feature = "fuzz")]
impl arbitrary::Arbitrary<'_> for PayloadInformationElementRepr {
    fn arbitrary(u: &mut arbitrary::Unstructured<'_>) -> arbitrary::Result<Self> {
        if u.int_in_range(0..=4)? == 0 {
            return Ok(Self::PayloadTermination);
        }

        let mut nested_information_elements = Vec::new();

        // Generate maximum 4 nested information elements
        for _ in 0..u.int_in_range(0..=4)? {
            nested_information_elements
                .push(NestedInformationElementRepr::arbitrary(u)?)
                .map_err(|_| arbitrary::Error::IncorrectFormat)?;
        }

        Ok(Self::Mlme(nested_information_elements))
    }
}

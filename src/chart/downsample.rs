//! Stride downsampling for rendering.

use std::borrow::Cow;

/// Reduce `items` to at most `max` elements by nearest-stride selection.
///
/// If `items.len() <= max` the input is returned borrowed. Otherwise exactly
/// `max` elements are picked at `floor(i * len / max)`; the first pick is
/// always index 0. No averaging, so local extrema between picks can be lost.
pub fn downsample<T: Clone>(items: &[T], max: usize) -> Cow<'_, [T]> {
    if items.len() <= max {
        return Cow::Borrowed(items);
    }
    Cow::Owned(
        stride_indices(items.len(), max)
            .into_iter()
            .map(|idx| items[idx].clone())
            .collect(),
    )
}

/// Indices `downsample` would select, for callers that keep their own storage
pub fn stride_indices(len: usize, max: usize) -> Vec<usize> {
    if len <= max {
        return (0..len).collect();
    }
    if max == 0 {
        return Vec::new();
    }
    let step = len as f64 / max as f64;
    (0..max)
        .map(|i| (((i as f64) * step).floor() as usize).min(len - 1))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_short_input_borrowed() {
        let data = vec![1, 2, 3];
        let out = downsample(&data, 5);
        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!(&*out, &[1, 2, 3]);
    }

    #[test]
    fn test_stride_selection() {
        let data: Vec<usize> = (0..10).collect();
        let out = downsample(&data, 4);
        // step 2.5 -> 0, 2, 5, 7
        assert_eq!(&*out, &[0, 2, 5, 7]);
    }

    #[test]
    fn test_zero_budget() {
        let data = vec![1.0, 2.0];
        assert!(downsample(&data, 0).is_empty());
        assert!(stride_indices(2, 0).is_empty());
    }

    proptest! {
        #[test]
        fn prop_length_is_min(len in 0usize..2000, max in 0usize..600) {
            let data: Vec<usize> = (0..len).collect();
            let out = downsample(&data, max);
            prop_assert_eq!(out.len(), len.min(max));
            if len <= max {
                prop_assert_eq!(&*out, &data[..]);
            } else if max > 0 {
                prop_assert_eq!(out[0], 0);
                prop_assert!(out.windows(2).all(|w| w[0] < w[1]));
            }
        }

        #[test]
        fn prop_indices_match_values(len in 0usize..500, max in 0usize..200) {
            let data: Vec<usize> = (0..len).collect();
            let out = downsample(&data, max);
            prop_assert_eq!(out.into_owned(), stride_indices(len, max));
        }
    }
}

use crate::engine_state::voxels::location::ColumnKey;

/// An inclusive square of column keys.
///
/// `RenderArea::around(c, d)` spans `c.x - d ..= c.x + d` by
/// `c.z - d ..= c.z + d`, so a half-width of 2 covers 5×5 columns.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RenderArea {
    pub min_x: i32,
    pub min_z: i32,
    pub max_x: i32,
    pub max_z: i32,
}

impl RenderArea {
    pub fn around(center: ColumnKey, half_width: u32) -> Self {
        let half_width = i32::try_from(half_width).unwrap_or(i32::MAX);
        RenderArea {
            min_x: center.x.saturating_sub(half_width),
            min_z: center.z.saturating_sub(half_width),
            max_x: center.x.saturating_add(half_width),
            max_z: center.z.saturating_add(half_width),
        }
    }

    pub fn contains(&self, key: ColumnKey) -> bool {
        (self.min_x..=self.max_x).contains(&key.x) && (self.min_z..=self.max_z).contains(&key.z)
    }

    /// Number of columns along one edge.
    pub fn width(&self) -> usize {
        (i64::from(self.max_x) - i64::from(self.min_x) + 1) as usize
    }

    pub fn len(&self) -> usize {
        let depth = (i64::from(self.max_z) - i64::from(self.min_z) + 1) as usize;
        self.width().saturating_mul(depth)
    }

    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_z > self.max_z
    }

    /// The area one row of constant z at a time, each row in increasing x.
    pub fn rows(self) -> impl Iterator<Item = Vec<ColumnKey>> {
        (self.min_z..=self.max_z).map(move |z| {
            (self.min_x..=self.max_x)
                .map(|x| ColumnKey::new(x, z))
                .collect()
        })
    }

    pub fn keys(self) -> impl Iterator<Item = ColumnKey> {
        self.rows().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_width_two_covers_five_by_five() {
        let area = RenderArea::around(ColumnKey::new(0, 0), 2);

        assert_eq!(area.len(), 25);
        assert_eq!(area.rows().count(), 5);
        assert!(area.rows().all(|row| row.len() == 5));
        assert!(area.contains(ColumnKey::new(-2, 2)));
        assert!(!area.contains(ColumnKey::new(3, 0)));
        assert_eq!(area.keys().next(), Some(ColumnKey::new(-2, -2)));
    }

    #[test]
    fn zero_half_width_is_the_center_only() {
        let center = ColumnKey::new(-7, 4);
        let area = RenderArea::around(center, 0);

        assert_eq!(area.keys().collect::<Vec<_>>(), vec![center]);
    }

    #[test]
    fn oversized_half_width_saturates_instead_of_wrapping() {
        let area = RenderArea::around(ColumnKey::new(5, -5), u32::MAX);

        assert!(area.contains(ColumnKey::new(5, -5)));
        assert!(area.contains(ColumnKey::new(i32::MIN, i32::MAX)));
        assert!(!area.is_empty());
    }
}

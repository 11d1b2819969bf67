//! Core data model types.
//!
//! Every stage of the pipeline reads and produces an in-memory [`DataSet`]: a [`Schema`]
//! (an ordered list of typed [`Field`]s) plus row-major [`Value`] storage.

/// Logical data type for a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// 64-bit signed integer (categorical codes).
    Int64,
    /// 64-bit floating point number (measurements, weights, derived scores).
    Float64,
    /// UTF-8 string (identifiers and recoded labels).
    Utf8,
}

impl DataType {
    /// Returns `true` for types filled with a column median during reconciliation.
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Int64 | Self::Float64)
    }
}

/// A single named, typed field in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field/column name.
    pub name: String,
    /// Field data type.
    pub data_type: DataType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// A list of fields describing the shape of a [`DataSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of a field by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Returns the field with the given name, if present.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A single typed value in a [`DataSet`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// UTF-8 string.
    Utf8(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Numeric view of the value. `NaN` is reported as missing.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int64(v) => Some(*v as f64),
            Self::Float64(v) if !v.is_nan() => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Utf8(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Build a float value, mapping `None` to [`Value::Null`].
    pub fn from_f64(v: Option<f64>) -> Self {
        v.map(Value::Float64).unwrap_or(Value::Null)
    }

    /// Build a text value, mapping `None` to [`Value::Null`].
    pub fn from_label(v: Option<&str>) -> Self {
        v.map(|s| Value::Utf8(s.to_string())).unwrap_or(Value::Null)
    }
}

/// In-memory tabular dataset.
///
/// Rows are stored as `Vec<Vec<Value>>` in the same order as the [`Schema`] fields.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSet {
    /// Schema describing row shape.
    pub schema: Schema,
    /// Row-major value storage.
    pub rows: Vec<Vec<Value>>,
}

impl DataSet {
    /// Create a dataset from schema and rows.
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> Self {
        Self { schema, rows }
    }

    /// Number of rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns in the dataset.
    pub fn column_count(&self) -> usize {
        self.schema.fields.len()
    }

    /// Iterate the values of one column, or `None` if the column does not exist.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Value>> {
        let idx = self.schema.index_of(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }

    /// Create a new dataset containing only rows that match `predicate`.
    ///
    /// The returned dataset preserves the original schema.
    pub fn filter_rows<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&[Value]) -> bool,
    {
        let rows = self
            .rows
            .iter()
            .filter(|row| predicate(row.as_slice()))
            .cloned()
            .collect();
        Self {
            schema: self.schema.clone(),
            rows,
        }
    }

    /// Create a new dataset by applying `mapper` to every row.
    ///
    /// The returned dataset preserves the original schema.
    ///
    /// # Panics
    ///
    /// Panics if `mapper` returns a row with a different length than the schema field count.
    pub fn map_rows<F>(&self, mut mapper: F) -> Self
    where
        F: FnMut(&[Value]) -> Vec<Value>,
    {
        let expected_len = self.schema.fields.len();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let out = mapper(row.as_slice());
                assert!(
                    out.len() == expected_len,
                    "mapped row length {} does not match schema length {}",
                    out.len(),
                    expected_len
                );
                out
            })
            .collect();

        Self {
            schema: self.schema.clone(),
            rows,
        }
    }

    /// Reduce (fold) all rows into an accumulator value.
    ///
    /// This is similar to `Iterator::fold`, but provides each row as `&[Value]`.
    pub fn reduce_rows<A, F>(&self, init: A, mut reducer: F) -> A
    where
        F: FnMut(A, &[Value]) -> A,
    {
        self.rows
            .iter()
            .fold(init, |acc, row| reducer(acc, row.as_slice()))
    }

    /// Rewrite every cell of column `idx` in place, optionally changing its type.
    pub fn update_column<F>(&mut self, idx: usize, data_type: DataType, mut f: F)
    where
        F: FnMut(&Value) -> Value,
    {
        self.schema.fields[idx].data_type = data_type;
        for row in &mut self.rows {
            row[idx] = f(&row[idx]);
        }
    }

    /// Append a column. `values` must hold exactly one value per row.
    ///
    /// # Panics
    ///
    /// Panics if `values.len()` differs from the row count.
    pub fn push_column(&mut self, field: Field, values: Vec<Value>) {
        assert_eq!(
            values.len(),
            self.rows.len(),
            "column '{}' has {} values for {} rows",
            field.name,
            values.len(),
            self.rows.len()
        );
        self.schema.fields.push(field);
        for (row, v) in self.rows.iter_mut().zip(values) {
            row.push(v);
        }
    }

    /// Rename columns according to `(from, to)` pairs. Unknown `from` names are ignored.
    pub fn rename_columns(&mut self, pairs: &[(&str, &str)]) {
        for (from, to) in pairs {
            if let Some(idx) = self.schema.index_of(from) {
                self.schema.fields[idx].name = (*to).to_string();
            }
        }
    }

    /// Project to `names` in the given order, silently skipping names that are not present.
    pub fn select_existing(&self, names: &[&str]) -> Self {
        let idxs: Vec<usize> = names
            .iter()
            .filter_map(|n| self.schema.index_of(n))
            .collect();
        self.project(&idxs)
    }

    /// Project to the columns at `idxs`, in that order.
    pub fn project(&self, idxs: &[usize]) -> Self {
        let schema = Schema::new(
            idxs.iter()
                .map(|&i| self.schema.fields[i].clone())
                .collect(),
        );
        let rows = self
            .rows
            .iter()
            .map(|row| idxs.iter().map(|&i| row[i].clone()).collect())
            .collect();
        Self { schema, rows }
    }

    /// Copy of rows `offset..offset + len` (clamped to the dataset bounds).
    pub fn slice(&self, offset: usize, len: usize) -> Self {
        let start = offset.min(self.rows.len());
        let end = start.saturating_add(len).min(self.rows.len());
        Self {
            schema: self.schema.clone(),
            rows: self.rows[start..end].to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataSet {
        DataSet::new(
            Schema::new(vec![
                Field::new("id", DataType::Utf8),
                Field::new("code", DataType::Int64),
                Field::new("score", DataType::Float64),
            ]),
            vec![
                vec![Value::Utf8("1".into()), Value::Int64(2), Value::Float64(1.5)],
                vec![Value::Utf8("2".into()), Value::Null, Value::Float64(f64::NAN)],
                vec![Value::Utf8("3".into()), Value::Int64(1), Value::Null],
            ],
        )
    }

    #[test]
    fn nan_is_not_a_number_value() {
        assert_eq!(Value::Float64(f64::NAN).as_f64(), None);
        assert_eq!(Value::Int64(3).as_f64(), Some(3.0));
        assert_eq!(Value::Utf8("3".into()).as_f64(), None);
    }

    #[test]
    fn select_existing_skips_unknown_names_and_reorders() {
        let ds = sample();
        let out = ds.select_existing(&["score", "missing", "id"]);
        assert_eq!(out.schema.field_names().collect::<Vec<_>>(), vec!["score", "id"]);
        assert_eq!(out.rows[0], vec![Value::Float64(1.5), Value::Utf8("1".into())]);
    }

    #[test]
    fn rename_and_push_column() {
        let mut ds = sample();
        ds.rename_columns(&[("code", "category"), ("nope", "x")]);
        assert_eq!(ds.schema.index_of("category"), Some(1));

        ds.push_column(
            Field::new("flag", DataType::Utf8),
            vec![Value::Null, Value::Utf8("y".into()), Value::Null],
        );
        assert_eq!(ds.column_count(), 4);
        assert_eq!(ds.rows[1][3], Value::Utf8("y".into()));
    }

    #[test]
    #[should_panic(expected = "has 1 values for 3 rows")]
    fn push_column_rejects_wrong_length() {
        let mut ds = sample();
        ds.push_column(Field::new("x", DataType::Utf8), vec![Value::Null]);
    }

    #[test]
    fn slice_is_clamped() {
        let ds = sample();
        assert_eq!(ds.slice(1, 10).row_count(), 2);
        assert_eq!(ds.slice(5, 10).row_count(), 0);
    }

    #[test]
    fn update_column_changes_type_and_values() {
        let mut ds = sample();
        ds.update_column(1, DataType::Utf8, |v| match v {
            Value::Int64(c) => Value::Utf8(format!("code-{c}")),
            _ => Value::Null,
        });
        assert_eq!(ds.schema.fields[1].data_type, DataType::Utf8);
        assert_eq!(ds.rows[0][1], Value::Utf8("code-2".into()));
        assert_eq!(ds.rows[1][1], Value::Null);
    }
}

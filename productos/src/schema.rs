use crate::producto::Producto;

tienda::register_schemas!(Producto);
